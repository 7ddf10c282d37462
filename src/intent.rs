//! Keyword-based intent classification
//!
//! Pure, deterministic mapping from a customer utterance to a coarse intent.
//! No model is involved: the text is lowercased and checked against keyword
//! groups in priority order, first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse category of a customer utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    ConsultarSaldo,
    InformacaoConta,
    SolicitarEmprestimo,
    ConversaGeral,
}

impl IntentLabel {
    /// Wire/label representation
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::ConsultarSaldo => "consultar_saldo",
            IntentLabel::InformacaoConta => "informacao_conta",
            IntentLabel::SolicitarEmprestimo => "solicitar_emprestimo",
            IntentLabel::ConversaGeral => "conversa_geral",
        }
    }
}

impl fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword groups checked in order; the first group with a hit decides.
const RULES: &[(&[&str], IntentLabel)] = &[
    (&["saldo"], IntentLabel::ConsultarSaldo),
    (&["conta"], IntentLabel::InformacaoConta),
    (&["empréstimo", "emprestimo"], IntentLabel::SolicitarEmprestimo),
];

/// Classify free text into an [`IntentLabel`]
///
/// Total over all inputs; text matching no keyword (including the empty
/// string) is [`IntentLabel::ConversaGeral`].
///
/// ```
/// use agentbank::intent::{classify, IntentLabel};
///
/// assert_eq!(classify("Qual o SALDO da minha conta?"), IntentLabel::ConsultarSaldo);
/// assert_eq!(classify("bom dia"), IntentLabel::ConversaGeral);
/// ```
pub fn classify(text: &str) -> IntentLabel {
    let normalized = text.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| normalized.contains(kw)))
        .map(|(_, label)| *label)
        .unwrap_or(IntentLabel::ConversaGeral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saldo_wins_over_conta() {
        assert_eq!(classify("saldo da minha conta"), IntentLabel::ConsultarSaldo);
    }

    #[test]
    fn test_conta_without_saldo() {
        assert_eq!(
            classify("detalhes da conta corrente"),
            IntentLabel::InformacaoConta
        );
    }

    #[test]
    fn test_conta_wins_over_emprestimo() {
        assert_eq!(
            classify("empréstimo na minha conta"),
            IntentLabel::InformacaoConta
        );
    }

    #[test]
    fn test_emprestimo_accented_and_unaccented() {
        assert_eq!(
            classify("quero um empréstimo"),
            IntentLabel::SolicitarEmprestimo
        );
        assert_eq!(
            classify("quero um emprestimo"),
            IntentLabel::SolicitarEmprestimo
        );
    }

    #[test]
    fn test_uppercase_accented_keyword_is_normalized() {
        assert_eq!(
            classify("SOLICITAR EMPRÉSTIMO"),
            IntentLabel::SolicitarEmprestimo
        );
    }

    #[test]
    fn test_no_keyword_is_general_conversation() {
        assert_eq!(classify("bom dia"), IntentLabel::ConversaGeral);
        assert_eq!(classify(""), IntentLabel::ConversaGeral);
    }

    #[test]
    fn test_keyword_inside_longer_word_matches() {
        // Plain substring containment: "contato" contains "conta".
        assert_eq!(classify("meu contato"), IntentLabel::InformacaoConta);
    }

    #[test]
    fn test_label_serializes_as_snake_case() {
        let json = serde_json::to_string(&IntentLabel::SolicitarEmprestimo).expect("serialize");
        assert_eq!(json, "\"solicitar_emprestimo\"");
        assert_eq!(IntentLabel::ConversaGeral.to_string(), "conversa_geral");
    }
}
