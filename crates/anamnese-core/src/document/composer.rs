//! Lays an intake record out as the anamnese document.
//!
//! Page geometry is A4 in millimetres. The fixed sections always fit on the
//! first page; long notes flow onto further pages.

use chrono::{Local, NaiveDateTime};

use crate::models::{ChoiceField, IntakeRecord};

use super::{Align, DocumentResult, DocumentSink, FontStyle, Rgb};

pub const BUSINESS_NAME: &str = "Yeda Lash Designer";
pub const DOCUMENT_SUBTITLE: &str = "ANAMNESE - PROCEDIMENTO DE CÍLIOS";
pub const NOT_INFORMED: &str = "Não informado";
pub const NOTES_HEADING: &str = "Observações:";
pub const NOTES_FALLBACK: &str = "Sem observações adicionais.";
pub const CONSENT_STATEMENT: &str =
    "Confirmo que as informações acima são verdadeiras e autorizo o procedimento.";
pub const FILE_NAME_PREFIX: &str = "Anamnese_YedaLash_";

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 20.0;
const CONTENT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;
const PAGE_BOTTOM: f64 = PAGE_HEIGHT - MARGIN;
const CENTER_X: f64 = PAGE_WIDTH / 2.0;
const VALUE_X: f64 = 70.0;
const FIELD_SPACING: f64 = 10.0;
const NOTES_LINE_HEIGHT: f64 = 5.0;

const NUDE: Rgb = Rgb(245, 235, 224);
const INK: Rgb = Rgb(26, 26, 26);
const MUTED: Rgb = Rgb(100, 100, 100);
const ROSE: Rgb = Rgb(165, 120, 100);
const BODY: Rgb = Rgb(40, 40, 40);
const DIVIDER: Rgb = Rgb(213, 189, 175);

/// Moment the document is generated, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuedAt(pub NaiveDateTime);

impl IssuedAt {
    pub fn now() -> Self {
        Self(Local::now().naive_local())
    }

    /// pt-BR convention, e.g. `18/10/2026, 14:05:09`.
    pub fn format_pt_br(&self) -> String {
        self.0.format("%d/%m/%Y, %H:%M:%S").to_string()
    }
}

/// `Anamnese_YedaLash_<name>.pdf`, every whitespace character replaced by `_`.
pub fn document_file_name(full_name: &str) -> String {
    let name: String = full_name
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    format!("{}{}.pdf", FILE_NAME_PREFIX, name)
}

fn or_not_informed(value: &str) -> &str {
    if value.is_empty() {
        NOT_INFORMED
    } else {
        value
    }
}

/// Labeled fields in document order with their rendered values.
pub fn document_fields(record: &IntakeRecord) -> Vec<(&'static str, String)> {
    let mut fields = Vec::with_capacity(9);
    fields.push(("Nome Completo", or_not_informed(&record.full_name).to_string()));
    fields.push(("Telefone", or_not_informed(&record.phone).to_string()));
    for field in ChoiceField::ALL {
        fields.push((field.document_label(), record.answer(field).label().to_string()));
    }
    fields.push((
        "Tipo de Cílios desejado",
        or_not_informed(&record.desired_style).to_string(),
    ));
    fields
}

/// Vertical position on the current page.
struct Cursor {
    y: f64,
}

impl Cursor {
    /// Break to a new page when `height` more would cross the bottom margin.
    fn reserve<S: DocumentSink + ?Sized>(&mut self, sink: &mut S, height: f64) {
        if self.y + height > PAGE_BOTTOM {
            sink.add_page();
            self.y = MARGIN;
        }
    }
}

/// Draw the anamnese for `record` and save it. Returns the file name.
///
/// Callers must check consent first; the composer renders whatever it is
/// given.
pub fn compose<S: DocumentSink + ?Sized>(
    record: &IntakeRecord,
    issued_at: &IssuedAt,
    sink: &mut S,
) -> DocumentResult<String> {
    draw_header(sink);

    sink.set_font_size(10.0);
    sink.set_text_color(MUTED);
    sink.text(
        MARGIN,
        50.0,
        &format!("Data de Emissão: {}", issued_at.format_pt_br()),
        Align::Left,
    );

    let mut cursor = Cursor { y: 65.0 };
    for (label, value) in document_fields(record) {
        sink.set_font(FontStyle::Bold);
        sink.set_text_color(ROSE);
        sink.text(MARGIN, cursor.y, &format!("{}:", label), Align::Left);
        sink.set_font(FontStyle::Normal);
        sink.set_text_color(BODY);
        sink.text(VALUE_X, cursor.y, &value, Align::Left);
        cursor.y += FIELD_SPACING;
    }

    draw_notes(sink, &mut cursor, &record.notes);

    cursor.y += 15.0;
    cursor.reserve(sink, 10.0);
    sink.set_draw_color(DIVIDER);
    sink.line(MARGIN, cursor.y, PAGE_WIDTH - MARGIN, cursor.y);
    cursor.y += 10.0;
    sink.set_font_size(8.0);
    sink.text(CENTER_X, cursor.y, CONSENT_STATEMENT, Align::Center);

    let file_name = document_file_name(&record.full_name);
    sink.save(&file_name)?;
    tracing::debug!(file_name = %file_name, "anamnese document saved");
    Ok(file_name)
}

fn draw_header<S: DocumentSink + ?Sized>(sink: &mut S) {
    sink.set_fill_color(NUDE);
    sink.fill_rect(0.0, 0.0, PAGE_WIDTH, 40.0);

    sink.set_text_color(INK);
    sink.set_font(FontStyle::Bold);
    sink.set_font_size(22.0);
    sink.text(CENTER_X, 20.0, BUSINESS_NAME, Align::Center);

    sink.set_font_size(12.0);
    sink.set_font(FontStyle::Normal);
    sink.text(CENTER_X, 30.0, DOCUMENT_SUBTITLE, Align::Center);
}

fn draw_notes<S: DocumentSink + ?Sized>(sink: &mut S, cursor: &mut Cursor, notes: &str) {
    cursor.y += 5.0;
    sink.set_font(FontStyle::Bold);
    sink.text(MARGIN, cursor.y, NOTES_HEADING, Align::Left);
    cursor.y += 7.0;

    sink.set_font(FontStyle::Normal);
    let body = if notes.is_empty() {
        NOTES_FALLBACK
    } else {
        notes
    };
    for line in sink.split_text_to_size(body, CONTENT_WIDTH) {
        cursor.reserve(sink, 0.0);
        sink.text(MARGIN, cursor.y, &line, Align::Left);
        cursor.y += NOTES_LINE_HEIGHT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RecordingSink, SinkOp};
    use crate::models::Answer;
    use chrono::NaiveDate;

    fn issued_at() -> IssuedAt {
        IssuedAt(
            NaiveDate::from_ymd_opt(2026, 10, 18)
                .unwrap()
                .and_hms_opt(14, 5, 9)
                .unwrap(),
        )
    }

    fn make_record() -> IntakeRecord {
        IntakeRecord {
            full_name: "Maria Silva".into(),
            phone: "(47) 99999-8888".into(),
            allergy: Answer::Yes,
            desired_style: "Efeito natural".into(),
            consent: true,
            ..IntakeRecord::default()
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            document_file_name("Maria Silva"),
            "Anamnese_YedaLash_Maria_Silva.pdf"
        );
        assert_eq!(
            document_file_name("Ana  Paula\tSouza"),
            "Anamnese_YedaLash_Ana__Paula_Souza.pdf"
        );
        assert_eq!(document_file_name(""), "Anamnese_YedaLash_.pdf");
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(issued_at().format_pt_br(), "18/10/2026, 14:05:09");
    }

    #[test]
    fn test_field_order_and_values() {
        let fields = document_fields(&make_record());
        let labels: Vec<_> = fields.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            vec![
                "Nome Completo",
                "Telefone",
                "Já fez cílios antes?",
                "Alergia a cola/cosméticos",
                "Sensibilidade nos olhos",
                "Usa lentes de contato",
                "Problema ocular",
                "Gestante/Amamentando",
                "Tipo de Cílios desejado",
            ]
        );
        assert_eq!(fields[3].1, "Sim");
        assert_eq!(fields[4].1, "Não");
    }

    #[test]
    fn test_empty_text_fields_are_not_informed() {
        let fields = document_fields(&IntakeRecord::default());
        assert_eq!(fields[0].1, NOT_INFORMED);
        assert_eq!(fields[1].1, NOT_INFORMED);
        assert_eq!(fields[8].1, NOT_INFORMED);
        // Choice fields always carry a value.
        assert!(fields[2..8].iter().all(|(_, v)| v == "Não"));
    }

    #[test]
    fn test_compose_draws_sections_in_order() {
        let mut sink = RecordingSink::new();
        let name = compose(&make_record(), &issued_at(), &mut sink).unwrap();

        assert_eq!(name, "Anamnese_YedaLash_Maria_Silva.pdf");
        assert_eq!(sink.saved(), vec![name.as_str()]);

        let texts = sink.texts();
        assert_eq!(texts[0], BUSINESS_NAME);
        assert_eq!(texts[1], DOCUMENT_SUBTITLE);
        assert_eq!(texts[2], "Data de Emissão: 18/10/2026, 14:05:09");
        assert_eq!(texts[3], "Nome Completo:");
        assert_eq!(texts[4], "Maria Silva");
        assert_eq!(*texts.last().unwrap(), CONSENT_STATEMENT);
        assert!(texts.contains(&NOTES_FALLBACK));
    }

    #[test]
    fn test_title_block_is_centered() {
        let mut sink = RecordingSink::new();
        compose(&make_record(), &issued_at(), &mut sink).unwrap();

        let centered: Vec<_> = sink
            .ops
            .iter()
            .filter_map(|op| match op {
                SinkOp::Text { text, align: Align::Center, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(centered, vec![BUSINESS_NAME, DOCUMENT_SUBTITLE, CONSENT_STATEMENT]);
    }

    #[test]
    fn test_divider_precedes_consent_statement() {
        let mut sink = RecordingSink::new();
        compose(&make_record(), &issued_at(), &mut sink).unwrap();

        let line_pos = sink.ops.iter().position(|op| matches!(op, SinkOp::Line { .. }));
        let consent_pos = sink.ops.iter().position(
            |op| matches!(op, SinkOp::Text { text, .. } if text == CONSENT_STATEMENT),
        );
        assert!(line_pos.unwrap() < consent_pos.unwrap());
    }

    #[test]
    fn test_only_empty_notes_use_fallback() {
        let mut record = make_record();
        record.notes = "   ".into();
        let mut sink = RecordingSink::new();
        compose(&record, &issued_at(), &mut sink).unwrap();
        assert!(!sink.texts().contains(&NOTES_FALLBACK));

        record.notes.clear();
        let mut sink = RecordingSink::new();
        compose(&record, &issued_at(), &mut sink).unwrap();
        assert!(sink.texts().contains(&NOTES_FALLBACK));
    }

    #[test]
    fn test_long_notes_paginate() {
        let mut record = make_record();
        record.notes = "Tenho sensibilidade a produtos com fragrância. ".repeat(200);

        let mut sink = RecordingSink::new();
        compose(&record, &issued_at(), &mut sink).unwrap();

        assert!(sink.page_count() > 1);
        for op in &sink.ops {
            if let SinkOp::Text { y, .. } = op {
                assert!(*y <= PAGE_BOTTOM, "text drawn below margin at {}", y);
            }
        }
    }

    #[test]
    fn test_short_notes_stay_on_one_page() {
        let mut record = make_record();
        record.notes = "Primeira vez fazendo lifting.".into();

        let mut sink = RecordingSink::new();
        compose(&record, &issued_at(), &mut sink).unwrap();

        assert_eq!(sink.page_count(), 1);
        assert!(sink.contains_text("Primeira vez fazendo lifting."));
    }
}
