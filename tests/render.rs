mod common;

use std::num::NonZeroUsize;

use common::{FakeFace, faces, fill_count, texts};
use placard::{
    PlacardConfig,
    fullwidth::{Fullwidth, Identity},
    layout::LettersPerPage,
    renderer::{DrawCommand, FaceRole, RecordingCanvas, WritingMode},
    script::Script,
};

fn render_with(
    config: &PlacardConfig,
    text: &str,
    face: &FakeFace,
) -> (placard::RenderReport, RecordingCanvas) {
    let mut canvas = RecordingCanvas::new();
    let report = placard::render(
        config,
        text,
        face,
        &FakeFace::LATIN,
        &Fullwidth,
        &mut canvas,
    );

    (report, canvas)
}

fn vertical() -> PlacardConfig {
    PlacardConfig {
        mode: WritingMode::Vertical,
        ..PlacardConfig::default()
    }
}

#[test]
fn default_text_is_one_page_of_two_rows() {
    let (report, canvas) = render_with(
        &PlacardConfig::default(),
        "This is\na test.",
        &FakeFace::LATIN,
    );

    assert_eq!(canvas.pages.len(), 1);
    assert_eq!(report.pages.len(), 1);
    assert!(report.pages[0].is_complete());
    assert_eq!(report.pages[0].rows.len(), 2);
    assert_eq!(report.substituted, None);

    let page = &canvas.pages[0];
    assert_eq!(fill_count(page), 2);
    assert_eq!(texts(page).concat(), "This isa test.");
    assert!(faces(page).iter().all(|face| *face == FaceRole::Primary));
    assert_eq!(canvas.depth(), 0);
}

#[test]
fn backgrounds_come_before_their_text() {
    let (_, canvas) = render_with(&PlacardConfig::default(), "AB\nCD", &FakeFace::LATIN);
    let page = &canvas.pages[0];

    assert!(matches!(page[0], DrawCommand::FillRect { .. }));
    assert!(matches!(page[3], DrawCommand::FillRect { .. }));
}

#[test]
fn fitted_rows_stay_on_the_page() {
    let config = PlacardConfig::default();
    let (report, canvas) = render_with(&config, "Wide placard text\nok", &FakeFace::LATIN);

    for row in &report.pages[0].rows {
        let fit = row.fit.expect("row fits");
        assert!(fit.font_size > 0.0 && fit.scale_x > 0.0 && fit.scale_y > 0.0);
    }

    for command in &canvas.pages[0] {
        if let DrawCommand::Text { transform, .. } = command {
            let [_, _, _, _, x, y] = transform.as_coeffs();
            assert!(x >= config.page.margin && x <= config.page.width - config.page.margin);
            assert!(y >= config.page.margin && y <= config.page.height - config.page.margin);
        }
    }
}

#[test]
fn escapes_and_tabs_are_decoded() {
    let (report, canvas) = render_with(&PlacardConfig::default(), "A\\tB\\nC", &FakeFace::LATIN);

    assert_eq!(report.pages[0].rows.len(), 2);
    assert_eq!(report.pages[0].rows[0].text, "A   B");
    assert_eq!(texts(&canvas.pages[0]), vec!["A", " ", " ", " ", "B", "C"]);
}

#[test]
fn empty_rows_are_skipped_but_keep_their_band() {
    let (report, canvas) = render_with(&PlacardConfig::default(), "A\n\nB", &FakeFace::LATIN);

    assert_eq!(report.skipped_rows(), 1);
    assert!(!report.pages[0].is_complete());
    assert_eq!(fill_count(&canvas.pages[0]), 3);
    assert_eq!(texts(&canvas.pages[0]), vec!["A", "B"]);
}

#[test]
fn letter_limit_paginates() {
    let config = PlacardConfig {
        letters_per_page: LettersPerPage::Limit(NonZeroUsize::new(3).expect("non-zero")),
        ..PlacardConfig::default()
    };
    let (report, canvas) = render_with(&config, "ABC DEF\nGHIJ", &FakeFace::LATIN);

    assert_eq!(canvas.pages.len(), 4);
    assert_eq!(report.pages.len(), 4);

    let sizes: Vec<usize> = canvas.pages.iter().map(|page| texts(page).len()).collect();
    assert_eq!(sizes, vec![3, 3, 3, 1]);
    assert_eq!(texts(&canvas.pages[1]).concat(), "DEF");
    assert!(canvas.pages.iter().all(|page| fill_count(page) == 1));
}

#[test]
fn uncovered_script_gets_an_error_page() {
    let (report, canvas) = render_with(&vertical(), "日本語のテキスト", &FakeFace::LATIN);

    assert_eq!(report.substituted, Some(Script::Japanese));
    assert_eq!(report.mode, WritingMode::Horizontal);
    assert!(report.pages[0].is_complete());

    let page = &canvas.pages[0];
    assert_eq!(texts(page).concat(), "   Error:   Not Japanese font");
    assert!(faces(page).iter().all(|face| *face == FaceRole::Fallback));
}

#[test]
fn covered_script_is_drawn_as_is() {
    let (report, canvas) = render_with(&PlacardConfig::default(), "테스트", &FakeFace::CJK);

    assert_eq!(report.substituted, None);
    assert_eq!(texts(&canvas.pages[0]), vec!["테", "스", "트"]);
}

#[test]
fn fixed_pitch_is_reported() {
    let (report, _) = render_with(&PlacardConfig::default(), "abc", &FakeFace::CJK_MONO);
    assert!(report.fixed_pitch);

    let (report, _) = render_with(&PlacardConfig::default(), "abc", &FakeFace::CJK);
    assert!(!report.fixed_pitch);
}

#[test]
fn vertical_text_is_widened_for_cjk_faces() {
    let (report, canvas) = render_with(&vertical(), "AB C", &FakeFace::CJK);

    assert_eq!(report.mode, WritingMode::Vertical);
    assert!(report.pages[0].is_complete());
    assert_eq!(texts(&canvas.pages[0]), vec!["Ａ", "Ｂ", " ", "Ｃ"]);
}

#[test]
fn vertical_text_is_untouched_for_latin_faces() {
    let (_, canvas) = render_with(&vertical(), "AB", &FakeFace::LATIN);

    assert_eq!(texts(&canvas.pages[0]), vec!["A", "B"]);
}

#[test]
fn identity_normalizer_keeps_half_width() {
    let mut canvas = RecordingCanvas::new();
    placard::render(
        &vertical(),
        "AB",
        &FakeFace::CJK,
        &FakeFace::LATIN,
        &Identity,
        &mut canvas,
    );

    assert_eq!(texts(&canvas.pages[0]), vec!["A", "B"]);
}

#[test]
fn vertical_dashes_are_turned() {
    let (_, canvas) = render_with(&vertical(), "アーア", &FakeFace::CJK);

    let transforms: Vec<[f64; 6]> = canvas.pages[0]
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Text { transform, .. } => Some(transform.as_coeffs()),
            DrawCommand::FillRect { .. } => None,
        })
        .collect();

    assert_eq!(transforms.len(), 3);

    // Upright glyphs keep a diagonal matrix; the dash is a quarter turn.
    assert!(transforms[0][0] > 0.0 && transforms[0][1].abs() < 1e-9);
    assert!(transforms[1][0].abs() < 1e-9 && transforms[1][1].abs() > 0.0);
    assert!(transforms[2][0] > 0.0);
}

#[test]
fn vertical_columns_run_right_to_left() {
    let (_, canvas) = render_with(&vertical(), "ア\nイ", &FakeFace::CJK);

    let xs: Vec<f64> = canvas.pages[0]
        .iter()
        .filter_map(|command| match command {
            DrawCommand::FillRect { rect, .. } => Some(rect.x0),
            DrawCommand::Text { .. } => None,
        })
        .collect();

    assert_eq!(xs.len(), 2);
    assert!(xs[0] > xs[1]);
}
