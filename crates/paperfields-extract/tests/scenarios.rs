//! End-to-end behaviour of the field resolvers on small synthetic documents.
//!
//! Each document is a handful of `(page, line)` pairs fed through
//! [`FieldExtractor`] via an in-memory source.

use paperfields_core::{META_AUTHOR, META_CREATION_DATE, META_TITLE, MemorySource, lines_from_pairs};
use paperfields_extract::{
    DocumentMetadata, ExtractionConfigBuilder, FieldExtractor, LineRecord, MissReason,
    normalize_title, process,
};

fn lines(pairs: &[(usize, &str)]) -> Vec<LineRecord> {
    lines_from_pairs(pairs.iter().copied())
}

/// A thesis cover, an abstract page and the start of the body.
fn thesis() -> Vec<(usize, &'static str)> {
    vec![
        (0, "國立臺灣科技大學"),
        (0, "資訊管理系碩士論文"),
        (0, "以深度學習進行智慧型感測資料分析之研究"),
        (0, "研究生：林大同"),
        (0, "指導教授：張教授"),
        (0, "中華民國 2022 年 6 月"),
        (1, "摘要"),
        (1, "本研究提出一種基於深度學習的感測資料分析方法，"),
        (1, "並以實際資料驗證其效果。"),
        (1, "關鍵字：深度學習、感測"),
        (2, "Abstract"),
        (2, "This thesis proposes a sensing data analysis method."),
        (2, "Keywords: deep learning"),
        (3, "目錄"),
        (4, "第一章 緒論"),
    ]
}

// ── Scenarios ──

#[test]
fn abstract_ends_at_keywords() {
    let result = FieldExtractor::new().extract_abstract(&lines(&[
        (0, "摘要"),
        (1, "本研究探討..."),
        (1, "關鍵字：教育、科技"),
    ]));
    assert_eq!(result.abstract_text(), Some("本研究探討..."));
    assert_eq!(result.end_marker(), Some("keywords_zh"));
    assert_eq!(result.end_page(), Some(1));
    assert_eq!(result.reason(), None);
}

#[test]
fn inline_abstract_ends_at_numbered_section() {
    let result = FieldExtractor::new().extract_abstract(&lines(&[
        (0, "Abstract: This paper presents a novel method."),
        (0, "1. Introduction"),
    ]));
    assert_eq!(result.abstract_text(), Some("This paper presents a novel method."));
    assert_eq!(result.start_marker(), Some("en_inline"));
    assert_eq!(result.end_marker(), Some("numbered_section"));
}

#[test]
fn filename_prefix_and_year_suffix() {
    let (title, year, _) = FieldExtractor::new().resolve_title_year_author(
        &[],
        "基礎3_智慧型感測系統設計_2022",
        &DocumentMetadata::new(),
    );
    assert_eq!(year.as_deref(), Some("2022"));
    let title = title.unwrap();
    assert!(!title.contains("基礎3_"));
    assert!(!title.contains("_2022"));
    assert_eq!(title, "智慧型感測系統設計");
}

#[test]
fn author_label_ignores_metadata() {
    let metadata = DocumentMetadata::new().with(META_AUTHOR, "Someone Else");
    let (_, _, author) = FieldExtractor::new().resolve_title_year_author(
        &lines(&[(0, "作者：王小明")]),
        "paper",
        &metadata,
    );
    assert_eq!(author.as_deref(), Some("王小明"));
}

#[test]
fn missing_start_marker() {
    let result = FieldExtractor::new()
        .extract_abstract(&lines(&[(0, "Title"), (0, "Some body text"), (1, "More text")]));
    assert_eq!(result.reason(), Some(MissReason::StartNotFound));
    assert_eq!(result.reason().unwrap().as_str(), "Start marker not found");
    assert_eq!(result.abstract_text(), None);
}

#[test]
fn cjk_name_near_advisor_beats_ascii_metadata() {
    let extractor = FieldExtractor::new();
    let metadata = DocumentMetadata::new().with(META_AUTHOR, "John Smith");
    let doc = lines(&[(0, "碩士論文"), (0, "指導教授：李教授"), (0, "陳大文")]);
    let (title, _, author) =
        extractor.resolve_title_year_author(&doc, "智慧型感測系統設計", &metadata);
    assert_eq!(title.as_deref(), Some("智慧型感測系統設計"));
    assert_eq!(author.as_deref(), Some("陳大文"));

    // found in the text before metadata is consulted, with no override involved
    let resolved = extractor.resolve_author(&doc, title.as_deref(), &metadata).unwrap();
    assert_eq!(resolved.provenance.to_string(), "label-3p");
}

#[test]
fn ascii_label_overridden_for_cjk_title() {
    let extractor = FieldExtractor::new();
    let doc = lines(&[(0, "Author: John Smith"), (0, "資訊工程學系"), (0, "陳大文")]);
    let author = extractor.resolve_author(&doc, Some("智慧型感測系統設計"), &DocumentMetadata::new());
    let author = author.unwrap();
    assert_eq!(author.value, "陳大文");
    assert_eq!(author.provenance.to_string(), "label-3p+cjk");
}

// ── Whole documents ──

#[test]
fn thesis_end_to_end() -> anyhow::Result<()> {
    let source = MemorySource::from_pairs(thesis());
    let doc = FieldExtractor::new().extract_document(&source, "基礎1_智慧型感測資料")?;

    assert_eq!(doc.record.title.as_deref(), Some("以深度學習進行智慧型感測資料分析之研究"));
    assert_eq!(doc.record.year.as_deref(), Some("2022"));
    assert_eq!(doc.record.author.as_deref(), Some("林大同"));
    assert_eq!(
        doc.record.abstract_text.as_deref(),
        Some("本研究提出一種基於深度學習的感測資料分析方法，並以實際資料驗證其效果。")
    );
    assert_eq!(doc.abstract_result.start_page(), Some(1));
    assert_eq!(doc.abstract_result.end_page(), Some(1));
    Ok(())
}

#[test]
fn english_paper_end_to_end() -> anyhow::Result<()> {
    let source = MemorySource::from_pairs([
        (0, "Sparse Attention for Long Document"),
        (0, "Summarization"),
        (0, "Jane Doe, John Roe, Max Mustermann"),
        (0, "Department of Computer Science, Example University"),
        (0, "Abstract"),
        (0, "We present a sparse attention mecha-"),
        (0, "nism for summarizing long documents."),
        (0, "Index Terms—attention, summarization"),
        (1, "Published in 2019"),
    ])
    .with_metadata(
        DocumentMetadata::new()
            .with(META_TITLE, "untitled")
            .with(META_AUTHOR, "Jane Doe")
            .with(META_CREATION_DATE, "D:20200101000000"),
    );
    let doc = FieldExtractor::new().extract_document(&source, "2101.00001")?;

    assert_eq!(
        doc.record.title.as_deref(),
        Some("Sparse Attention for Long Document Summarization")
    );
    assert_eq!(doc.record.year.as_deref(), Some("2019"));
    assert_eq!(doc.record.author.as_deref(), Some("Jane Doe"));
    assert_eq!(
        doc.record.abstract_text.as_deref(),
        Some("We present a sparse attention mechanism for summarizing long documents.")
    );
    assert_eq!(doc.abstract_result.end_marker(), Some("index_terms"));
    Ok(())
}

#[test]
fn record_serializes_with_abstract_key() -> anyhow::Result<()> {
    let record = process(
        Some("題目".into()),
        Some("2022".into()),
        None,
        Some("第一行\n第二行".into()),
    );
    let json = serde_json::to_value(&record)?;
    assert_eq!(json["title"], "題目");
    assert_eq!(json["abstract"], "第一行第二行");
    assert!(json["author"].is_null());
    Ok(())
}

// ── Properties ──

#[test]
fn resolution_is_deterministic() {
    let extractor = FieldExtractor::new();
    let doc = lines(&thesis());
    let metadata = DocumentMetadata::new().with(META_AUTHOR, "admin");
    let first = extractor.resolve_title_year_author(&doc, "基礎1_感測_2020", &metadata);
    for _ in 0..5 {
        assert_eq!(
            extractor.resolve_title_year_author(&doc, "基礎1_感測_2020", &metadata),
            first
        );
        assert_eq!(extractor.extract_abstract(&doc), extractor.extract_abstract(&doc));
    }
}

#[test]
fn normalization_is_idempotent() {
    for title in [
        "以RBF-UNet為基礎之影像分割 定稿",
        "深度學習-應用 (v2)",
        "A Study\nof Things final",
        "  多重   空白  ",
        "基於CNN的影像辨識_最終版",
    ] {
        let once = normalize_title(title);
        assert_eq!(normalize_title(&once), once, "{title:?}");
    }
}

#[test]
fn span_invariant_and_exactly_one_of() {
    let extractor = FieldExtractor::with_config(
        ExtractionConfigBuilder::new().max_abstract_pages(2).build().unwrap(),
    );
    let max_pages = extractor.config().max_abstract_pages();
    let documents: Vec<Vec<(usize, &str)>> = vec![
        vec![],
        vec![(0, "no marker here")],
        vec![(0, "摘要"), (1, "a"), (2, "b"), (3, "c")],
        vec![(3, "Abstract"), (3, ""), (4, "12")],
        vec![(0, "ABSTRACT"), (0, "text"), (0, "References")],
        vec![(1, "摘要："), (1, "內容"), (1, "更多"), (2, "結尾")],
        thesis(),
    ];
    for pairs in documents {
        let result = extractor.extract_abstract(&lines(&pairs));
        assert!(
            result.abstract_text().is_some() != result.reason().is_some(),
            "{pairs:?}"
        );
        if result.abstract_text().is_some() {
            let start = result.start_page().unwrap();
            let end = result.end_page().unwrap();
            assert!(start <= end && end <= start + max_pages - 1, "{pairs:?}");
        }
    }
}

#[test]
fn year_is_four_digits_in_range() {
    let extractor = FieldExtractor::new();
    let cases: [(&str, &[(usize, &str)], &str); 4] = [
        ("paper_2021", &[], ""),
        ("paper", &[(0, "Received 1999; accepted 2000")], ""),
        ("paper", &[(0, "ID 12345 and 21000")], "D:20190101"),
        ("report (2008)", &[], ""),
    ];
    for (stem, pairs, creation) in cases {
        let metadata = DocumentMetadata::new().with(META_CREATION_DATE, creation);
        let (_, year, _) = extractor.resolve_title_year_author(&lines(pairs), stem, &metadata);
        let year = year.unwrap();
        assert_eq!(year.len(), 4);
        let n: u32 = year.parse().unwrap();
        assert!((1900..=2099).contains(&n), "{year}");
    }
}
