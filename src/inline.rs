//! Catalog embedded in the binary, published without any I/O.

use crate::types::{Catalog, ProblemRecord};

#[allow(clippy::too_many_arguments)]
fn record(
    id: &str,
    title: &str,
    brand: &str,
    model: &str,
    symptoms: &[&str],
    error_codes: &[&str],
    source_url: &str,
    source: &str,
) -> ProblemRecord {
    ProblemRecord {
        id: id.to_string(),
        title: title.to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
        error_codes: error_codes.iter().map(|s| s.to_string()).collect(),
        source_url: source_url.to_string(),
        source: source.to_string(),
        date_added: None,
    }
}

/// The embedded catalog, in display order.
pub fn inline_catalog() -> Catalog {
    vec![
        record(
            "vaz-2107-no-start-cold",
            "ВАЗ 2107 не заводится на холодную",
            "ВАЗ",
            "2107",
            &["не заводится", "стартер крутит, схватов нет"],
            &[],
            "https://drive2.ru/l/vaz2107-cold-start",
            "архив форума",
        ),
        record(
            "lada-granta-check-engine-p0300",
            "Лада Гранта: горит check engine, троит на холостых",
            "ЛАДА",
            "Granta",
            &["check engine", "троит"],
            &["P0300", "P0301"],
            "https://drive2.ru/l/granta-p0300",
            "архив форума",
        ),
        record(
            "toyota-corolla-no-charge",
            "Toyota Corolla E150: нет зарядки после замены ремня",
            "TOYOTA",
            "Corolla E150",
            &["нет зарядки", "горит лампа АКБ"],
            &["P0562"],
            "https://www.youtube.com/watch?v=corolla-alternator",
            "видео",
        ),
        record(
            "ford-focus-2-knock",
            "Ford Focus 2 стучит при прогреве",
            "FORD",
            "Focus II",
            &["стучит"],
            &[],
            "https://drive2.ru/l/focus2-knock",
            "архив форума",
        ),
        record(
            "kia-rio-parasitic-drain",
            "Kia Rio: утечка тока, за ночь садится аккумулятор",
            "KIA",
            "Rio III",
            &["утечка", "не заводится"],
            &["B1602"],
            "https://www.youtube.com/watch?v=rio-drain",
            "видео",
        ),
    ]
}
