//! Page layout: header, three labeled field groups, the consent box, the
//! submit control and the footer.

use chrono::Datelike;

use crate::document::{IssuedAt, BUSINESS_NAME};
use crate::models::{ChoiceField, IntakeRecord, TextField};
use crate::submit::SubmitState;

use super::editors::{ChoiceControl, ConsentCheckbox, PhoneInput, TextInput};

/// A single editor slot on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    Text(TextField),
    Phone,
    Choice(ChoiceField),
}

/// A titled group of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldGroup {
    pub title: &'static str,
    pub slots: &'static [FieldSlot],
}

pub const IDENTIFICATION: FieldGroup = FieldGroup {
    title: "Identificação",
    slots: &[FieldSlot::Text(TextField::FullName), FieldSlot::Phone],
};

pub const HEALTH: FieldGroup = FieldGroup {
    title: "Saúde e Sensibilidade",
    slots: &[
        FieldSlot::Choice(ChoiceField::PriorProcedure),
        FieldSlot::Choice(ChoiceField::Allergy),
        FieldSlot::Choice(ChoiceField::EyeSensitivity),
        FieldSlot::Choice(ChoiceField::ContactLenses),
        FieldSlot::Choice(ChoiceField::EyeCondition),
        FieldSlot::Choice(ChoiceField::PregnantOrNursing),
    ],
};

pub const PREFERENCES: FieldGroup = FieldGroup {
    title: "Desejos e Observações",
    slots: &[
        FieldSlot::Text(TextField::DesiredStyle),
        FieldSlot::Text(TextField::Notes),
    ],
};

/// Groups in page order.
pub const FORM_LAYOUT: [FieldGroup; 3] = [IDENTIFICATION, HEALTH, PREFERENCES];

pub const PAGE_SUBTITLE: &str = "Lash Lifting & Estética Premium";

pub const PAGE_TAGLINE: &str = "“Beleza, cuidado e profissionalismo em cada detalhe.”";

pub const PAGE_TITLE: &str = "Anamnese para Procedimento de Cílios";

pub const PAGE_INTRO: &str = "Sua segurança é nossa prioridade. Preencha os campos abaixo com atenção para garantirmos o melhor resultado para o seu olhar.";

/// `© {year} Yeda Lash Designer • Joinville/SC`
pub fn page_footer(year: i32) -> String {
    format!("© {} {} • Joinville/SC", year, BUSINESS_NAME)
}

fn slot_lines(slot: FieldSlot, record: &IntakeRecord) -> String {
    let (label, value, placeholder) = match slot {
        FieldSlot::Text(field) => {
            let input = TextInput::new(field);
            (input.label(), input.value(record), input.placeholder())
        }
        FieldSlot::Phone => (
            PhoneInput::LABEL,
            PhoneInput.value(record),
            PhoneInput::PLACEHOLDER,
        ),
        FieldSlot::Choice(field) => {
            let control = ChoiceControl::from_record(field, record);
            let options: Vec<String> = control
                .options()
                .iter()
                .map(|option| {
                    let mark = if option.selected { "(x)" } else { "( )" };
                    format!("{} {}", mark, option.label)
                })
                .collect();
            return format!("{}\n    {}", control.label(), options.join("  "));
        }
    };

    if value.is_empty() {
        format!("{}\n    [{}]", label, placeholder)
    } else {
        format!("{}\n    {}", label, value)
    }
}

/// The whole page as plain text, filled with `record`.
pub fn page_outline(record: &IntakeRecord, state: SubmitState, today: &IssuedAt) -> String {
    let mut lines = vec![
        BUSINESS_NAME.to_string(),
        PAGE_SUBTITLE.to_string(),
        PAGE_TAGLINE.to_string(),
        String::new(),
        PAGE_TITLE.to_string(),
        PAGE_INTRO.to_string(),
    ];

    for group in FORM_LAYOUT {
        lines.push(String::new());
        lines.push(format!("## {}", group.title));
        for slot in group.slots {
            lines.push(slot_lines(*slot, record));
        }
    }

    let checkbox = if ConsentCheckbox.checked(record) { "[x]" } else { "[ ]" };
    lines.push(String::new());
    lines.push(format!("{} {}", checkbox, ConsentCheckbox.label()));
    lines.push(format!("< {} >", state.button_label()));
    lines.push(String::new());
    lines.push(page_footer(today.0.year()));

    lines.join("\n")
}
