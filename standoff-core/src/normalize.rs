//! # Normalização do Texto
//!
//! Opcionalmente translitera o texto para ASCII (ex: "São" → "Sao",
//! "ß" → "ss") antes da tokenização. Como a transliteração pode mudar o
//! tamanho de cada caractere, o normalizador devolve junto um **mapa de
//! offsets** monotônico:
//!
//! ```text
//! original:    S  ã  o  ␠  P  a  u  l  o
//! char idx:    0  1  2  3  4  5  6  7  8  (9)
//! offsets[i]:  0  1  2  3  4  5  6  7  8  (9)   bytes no texto normalizado
//! ```
//!
//! `offsets[i]` é o byte do texto normalizado onde começa a imagem do
//! caractere original `i`, e `offsets[n] == normalized.len()`. Qualquer
//! intervalo em offsets de caractere originais (como os do `.ann`) pode então
//! ser traduzido sem perda para bytes do texto normalizado, onde vivem os
//! tokens.
//!
//! Sem transliteração o texto é mantido e o mapa é apenas caractere → byte.

use crate::annotation::CharRange;

/// Texto normalizado e o mapa de offsets de volta ao original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    offsets: Vec<usize>,
}

impl Normalized {
    /// Número de caracteres do texto **original**.
    pub fn original_len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Byte no texto normalizado correspondente ao caractere original `char_idx`.
    pub fn byte_offset(&self, char_idx: usize) -> Option<usize> {
        self.offsets.get(char_idx).copied()
    }

    /// Traduz um intervalo de caracteres originais para bytes normalizados.
    ///
    /// Retorna `None` se o intervalo ultrapassa o fim do texto.
    pub fn char_span_to_bytes(&self, span: CharRange) -> Option<(usize, usize)> {
        if span.start > span.end {
            return None;
        }
        Some((self.byte_offset(span.start)?, self.byte_offset(span.end)?))
    }
}

/// Normaliza o texto, transliterando para ASCII se `asciify` for verdadeiro.
pub fn normalize(text: &str, asciify: bool) -> Normalized {
    let mut offsets = Vec::with_capacity(text.len() + 1);

    if !asciify {
        offsets.extend(text.char_indices().map(|(byte, _)| byte));
        offsets.push(text.len());
        return Normalized {
            text: text.to_string(),
            offsets,
        };
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        offsets.push(out.len());
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        // Caracteres sem transliteração conhecida são preservados
        match deunicode::deunicode_char(ch) {
            Some(folded) => out.push_str(folded),
            None => out.push(ch),
        }
    }
    offsets.push(out.len());

    Normalized { text: out, offsets }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_without_asciify() {
        let n = normalize("São Paulo", false);
        assert_eq!(n.text, "São Paulo");
        assert_eq!(n.original_len(), 9);
        // "ã" ocupa 2 bytes: o caractere 2 começa no byte 3
        assert_eq!(n.byte_offset(2), Some(3));
        assert_eq!(n.byte_offset(9), Some(n.text.len()));
    }

    #[test]
    fn test_asciify_length_preserving() {
        let n = normalize("São Paulo", true);
        assert_eq!(n.text, "Sao Paulo");
        assert_eq!(n.char_span_to_bytes(CharRange::new(4, 9)), Some((4, 9)));
        assert_eq!(&n.text[4..9], "Paulo");
    }

    #[test]
    fn test_asciify_expanding_character() {
        // "ß" vira "ss": tudo depois dele desloca um byte no texto normalizado
        let n = normalize("aßb", true);
        assert_eq!(n.text, "assb");
        let (s, e) = n.char_span_to_bytes(CharRange::new(2, 3)).unwrap();
        assert_eq!(&n.text[s..e], "b");
    }

    #[test]
    fn test_offsets_monotonic() {
        let n = normalize("Ærø — Œuvre 北京", true);
        let bytes: Vec<usize> = (0..=n.original_len())
            .map(|i| n.byte_offset(i).unwrap())
            .collect();
        assert!(bytes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*bytes.last().unwrap(), n.text.len());
        assert!(n.text.is_ascii());
    }

    #[test]
    fn test_out_of_range_span() {
        let n = normalize("abc", false);
        assert_eq!(n.char_span_to_bytes(CharRange::new(1, 4)), None);
    }

    #[test]
    fn test_empty_text() {
        let n = normalize("", true);
        assert_eq!(n.text, "");
        assert_eq!(n.original_len(), 0);
        assert_eq!(n.byte_offset(0), Some(0));
    }
}
