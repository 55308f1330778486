//! Tests for question classification and column detection.

use sqlgate::catalog::{allowed_columns, ColumnMeta, Whitelist};
use sqlgate::intent::columns::{detect_group_column, detect_sum_column, detect_target_column};
use sqlgate::intent::{classify, normalize_question, QuestionSignals};
use sqlgate::plan::Intent;

fn whitelist(names: &[&str]) -> Whitelist {
    let catalog: Vec<ColumnMeta> = names.iter().map(|n| ColumnMeta::new(n, "text")).collect();
    allowed_columns(&catalog)
}

#[test]
fn test_count_beats_distinct_vocabulary() {
    assert_eq!(classify("quantas zonas existem"), Some(Intent::Count));
    assert_eq!(classify("quantos registros há?"), Some(Intent::Count));
}

#[test]
fn test_precedence() {
    assert_eq!(classify("quais colunas a tabela tem"), Some(Intent::Schema));
    assert_eq!(classify("quais zonas existem"), Some(Intent::Distinct));
    assert_eq!(classify("soma da área"), Some(Intent::Sum));
    assert_eq!(classify("área total por zona"), Some(Intent::GroupedSum));
    assert_eq!(classify("mostrar todas as linhas"), Some(Intent::Detail));
    assert_eq!(classify("bom dia"), None);
}

#[test]
fn test_detail_vocabulary_blocks_distinct() {
    let signals = QuestionSignals::detect("mostrar quais zonas existem");
    assert!(signals.distinct);
    assert!(!signals.is_distinct());
    assert_eq!(signals.classify(), Some(Intent::Detail));
}

#[test]
fn test_word_boundaries() {
    // "porto" must not raise the group-by signal
    assert!(!QuestionSignals::detect("soma da área do porto").wants_group_by());
    // "totalmente" is not "total"
    assert!(!QuestionSignals::detect("totalmente diferente").is_sum());
}

#[test]
fn test_longest_column_wins() {
    let wl = whitelist(&["pan", "nomepan"]);
    assert_eq!(detect_target_column("quais nomepan existem", &wl), Some("nomepan"));
    assert_eq!(detect_target_column("quais pan existem", &wl), Some("pan"));
    assert_eq!(detect_target_column("quais zonas existem", &wl), None);
}

#[test]
fn test_column_match_is_token_bounded() {
    let wl = whitelist(&["zona"]);
    assert_eq!(detect_target_column("quais zonas existem", &wl), None);
    assert_eq!(detect_target_column("Quais ZONA existem?", &wl), Some("zona"));
}

#[test]
fn test_sum_column_hints() {
    let wl = whitelist(&["zona", "area_ha", "perimetro_m"]);
    let area = QuestionSignals::detect("soma da área");
    assert_eq!(detect_sum_column(&area, &wl), Some("area_ha"));

    let perimeter = QuestionSignals::detect("soma do perímetro");
    assert_eq!(detect_sum_column(&perimeter, &wl), Some("perimetro_m"));

    let none = QuestionSignals::detect("soma de tudo");
    assert_eq!(detect_sum_column(&none, &wl), None);
}

#[test]
fn test_group_column_skips_sum_column() {
    let wl = whitelist(&["zona", "area_ha"]);
    assert_eq!(
        detect_group_column("area_ha total por zona", &wl, Some("area_ha")),
        Some("zona")
    );
}

#[test]
fn test_normalize_question() {
    assert_eq!(normalize_question("  Quantas   ZONAS\texistem? "), "quantas zonas existem?");
}
