//! Field identifiers and the binary answer type.

use serde::{Deserialize, Serialize};

/// Answer to one of the yes/no health questions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Answer {
    #[serde(rename = "Sim")]
    Yes,
    #[serde(rename = "Não")]
    #[default]
    No,
}

impl Answer {
    /// Both options, affirmative first (the order they are shown in).
    pub const ALL: [Answer; 2] = [Answer::Yes, Answer::No];

    /// Display label, also the value written into the document.
    pub fn label(self) -> &'static str {
        match self {
            Answer::Yes => "Sim",
            Answer::No => "Não",
        }
    }

    pub fn from_bool(yes: bool) -> Self {
        if yes {
            Answer::Yes
        } else {
            Answer::No
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Answer::Yes)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The six health and sensitivity questions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceField {
    PriorProcedure,
    Allergy,
    EyeSensitivity,
    ContactLenses,
    EyeCondition,
    PregnantOrNursing,
}

impl ChoiceField {
    /// Questions in form and document order.
    pub const ALL: [ChoiceField; 6] = [
        ChoiceField::PriorProcedure,
        ChoiceField::Allergy,
        ChoiceField::EyeSensitivity,
        ChoiceField::ContactLenses,
        ChoiceField::EyeCondition,
        ChoiceField::PregnantOrNursing,
    ];

    /// Question as asked on the form.
    pub fn form_label(self) -> &'static str {
        match self {
            ChoiceField::PriorProcedure => "Já realizou extensão/lifting?",
            ChoiceField::Allergy => "Alergia a cola ou cosméticos?",
            ChoiceField::EyeSensitivity => "Sensibilidade nos olhos?",
            ChoiceField::ContactLenses => "Usa lentes de contato?",
            ChoiceField::EyeCondition => "Possui algum problema ocular?",
            ChoiceField::PregnantOrNursing => "Gestante ou amamentando?",
        }
    }

    /// Label printed in the anamnese document.
    pub fn document_label(self) -> &'static str {
        match self {
            ChoiceField::PriorProcedure => "Já fez cílios antes?",
            ChoiceField::Allergy => "Alergia a cola/cosméticos",
            ChoiceField::EyeSensitivity => "Sensibilidade nos olhos",
            ChoiceField::ContactLenses => "Usa lentes de contato",
            ChoiceField::EyeCondition => "Problema ocular",
            ChoiceField::PregnantOrNursing => "Gestante/Amamentando",
        }
    }
}

/// Free-text fields of the form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    FullName,
    DesiredStyle,
    Notes,
}

impl TextField {
    pub const ALL: [TextField; 3] = [TextField::FullName, TextField::DesiredStyle, TextField::Notes];

    pub fn form_label(self) -> &'static str {
        match self {
            TextField::FullName => "Nome Completo",
            TextField::DesiredStyle => "Tipo de Cílios Desejado",
            TextField::Notes => "Observações Adicionais",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            TextField::FullName => "Ex: Maria Silva",
            TextField::DesiredStyle => "Ex: Efeito natural, Boneca, Gatinho...",
            TextField::Notes => "Conte-nos algo importante sobre sua saúde ou preferência...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_defaults_to_no() {
        assert_eq!(Answer::default(), Answer::No);
        assert_eq!(Answer::default().label(), "Não");
    }

    #[test]
    fn test_answer_serde_uses_labels() {
        assert_eq!(serde_json::to_string(&Answer::Yes).unwrap(), "\"Sim\"");
        let parsed: Answer = serde_json::from_str("\"Não\"").unwrap();
        assert_eq!(parsed, Answer::No);
    }

    #[test]
    fn test_choice_fields_are_distinct() {
        let labels: std::collections::HashSet<_> =
            ChoiceField::ALL.iter().map(|f| f.document_label()).collect();
        assert_eq!(labels.len(), ChoiceField::ALL.len());
    }
}
