//! End-to-end tests: extraction, generation and reconciliation together

#[cfg(test)]
mod tests {
    use crate::{
        ArtifactGenerator, ExtractorError, PipelineConfig, ReconcileMode, Reconciler,
    };
    use folio_domain::traits::{OcrEngine, ResultCache, TextLayer};
    use folio_domain::{
        EntryKind, FormatContract, GeneratedArtifact, GenerationRequest, Record, ReferenceSet,
        TextOrigin,
    };
    use folio_llm::MockProvider;
    use folio_pdf::TextExtractor;
    use folio_store::{FsCache, MemoryCache};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone)]
    struct PagesLayer {
        pages: Vec<String>,
        calls: Arc<AtomicUsize>,
    }

    impl PagesLayer {
        fn new(pages: &[&str]) -> Self {
            Self {
                pages: pages.iter().map(|p| p.to_string()).collect(),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl TextLayer for PagesLayer {
        type Error = String;
        fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.clone())
        }
    }

    #[derive(Clone, Default)]
    struct CountingOcr {
        calls: Arc<AtomicUsize>,
    }

    impl OcrEngine for CountingOcr {
        type Error = String;
        fn recognize_pages(&self, _pdf: &[u8]) -> Result<Vec<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["Scanned: the treaty was signed on 1648-10-24.".to_string()])
        }
    }

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn extracted_records() -> Vec<Record> {
        vec![
            rec(&[("chapter", "1"), ("title", "Cells"), ("topic", "Biology"), ("description", "Cell structure")]),
            rec(&[("chapter", "2"), ("title", "Photosynthesis"), ("topic", "Biology"), ("description", "Light to sugar")]),
        ]
    }

    fn reference_with(id_column: &str) -> ReferenceSet {
        ReferenceSet::new(
            vec![id_column.to_string(), "title".to_string()],
            vec![
                rec(&[(id_column, "R1"), ("title", "Cell biology")]),
                rec(&[(id_column, "R2"), ("title", "Plant energy")]),
            ],
        )
    }

    #[tokio::test]
    async fn test_three_page_pdf_to_csv_is_cached() {
        let layer = PagesLayer::new(&[
            "Founded in 1901 as a small workshop on the river.",
            "In 1923 the company moved to its current headquarters.",
            "The 1969 expansion doubled the factory floor.",
        ]);
        let ocr = CountingOcr::default();
        let cache = MemoryCache::new();
        let extractor = TextExtractor::new(layer.clone(), ocr.clone(), cache.clone());

        let text = extractor.extract_bytes(b"%PDF three pages").unwrap();
        assert_eq!(text.origin, TextOrigin::TextLayer);
        assert_eq!(text.pages().len(), 3);

        let llm = MockProvider::new("```csv\ndate,event\n1901,founded\n1923,moved\n1969,expansion\n```");
        let generator = ArtifactGenerator::new(llm.clone(), cache.clone(), PipelineConfig::default());
        let request = GenerationRequest::new(text.text.clone(), "list all dates", FormatContract::Csv);

        let first = generator.generate(&request).await.unwrap();
        assert_eq!(
            first.artifact,
            GeneratedArtifact::Csv("date,event\n1901,founded\n1923,moved\n1969,expansion".to_string())
        );
        assert_eq!(first.artifact.row_count(), 3);
        assert!(!first.metadata.from_cache);
        assert_eq!(first.metadata.chunk_count, 1);
        assert_eq!(llm.call_count(), 1);

        let second = generator.generate(&request).await.unwrap();
        assert_eq!(second.artifact, first.artifact);
        assert!(second.metadata.from_cache);
        assert_eq!(llm.call_count(), 1);

        assert_eq!(layer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
        assert!(cache.contains(EntryKind::Csv, &request.fingerprint()).unwrap());
    }

    #[tokio::test]
    async fn test_short_text_layer_uses_ocr_text_for_generation() {
        let layer = PagesLayer::new(&["Signed 1648"]);
        let ocr = CountingOcr::default();
        let extractor = TextExtractor::new(layer.clone(), ocr.clone(), MemoryCache::new());

        let text = extractor.extract_bytes(b"%PDF scanned").unwrap();
        assert!(matches!(text.origin, TextOrigin::Ocr { .. }));
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);

        let llm = MockProvider::new("date\n1648-10-24");
        let generator = ArtifactGenerator::new(llm.clone(), MemoryCache::new(), PipelineConfig::default());
        let request = GenerationRequest::new(text.text, "list all dates", FormatContract::Csv);
        generator.generate(&request).await.unwrap();

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("--- OCR Page 1 Content ---"));
        assert!(prompt.contains("1648-10-24"));
    }

    #[tokio::test]
    async fn test_generation_persists_to_disk_cache() {
        let dir = TempDir::new().unwrap();
        let cache = FsCache::open(dir.path()).unwrap();
        let llm = MockProvider::new(r#"[{"chapter": "1", "title": "Cells", "topic": "Biology", "description": "x"},]"#);
        let generator = ArtifactGenerator::new(llm.clone(), cache.clone(), PipelineConfig::default());

        let contract = FormatContract::records(PipelineConfig::default().record_fields);
        let request = GenerationRequest::new("chapter text", "extract chapters", contract);
        let outcome = generator.generate(&request).await.unwrap();
        assert_eq!(outcome.artifact.row_count(), 1);

        // A fresh generator over the same directory answers from disk
        let reopened = ArtifactGenerator::new(
            llm.clone(),
            FsCache::open(dir.path()).unwrap(),
            PipelineConfig::default(),
        );
        let replay = reopened.generate(&request).await.unwrap();
        assert!(replay.metadata.from_cache);
        assert_eq!(replay.artifact, outcome.artifact);
        assert_eq!(llm.call_count(), 1);
        assert!(cache.entry_path(EntryKind::Json, &request.fingerprint()).is_file());
    }

    #[tokio::test]
    async fn test_chunk_failure_is_tolerated() {
        let llm = MockProvider::new("unused").with_queue([
            r#"[{"title": "A"}]"#,
            "Sorry, I cannot help with that.",
            r#"```json
[{"title": "C"}]
```"#,
        ]);
        let config = PipelineConfig {
            max_chunk_size: 10,
            ..Default::default()
        };
        let generator = ArtifactGenerator::new(llm.clone(), MemoryCache::new(), config);

        let request = GenerationRequest::new(
            "aaaaaaaaaabbbbbbbbbbccccc",
            "titles",
            FormatContract::records(["title"]),
        );
        let outcome = generator.generate(&request).await.unwrap();

        assert_eq!(llm.call_count(), 3);
        assert_eq!(outcome.metadata.chunk_count, 3);
        assert_eq!(outcome.metadata.failures.len(), 1);
        assert_eq!(outcome.metadata.failures[0].chunk_index, 1);
        assert_eq!(
            outcome.artifact,
            GeneratedArtifact::Records(vec![rec(&[("title", "A")]), rec(&[("title", "C")])])
        );

        // Chunks are sent in order
        let prompts = llm.prompts();
        assert!(prompts[0].contains("aaaaaaaaaa"));
        assert!(prompts[2].contains("ccccc"));
    }

    #[tokio::test]
    async fn test_chunked_csv_merges_headers() {
        let llm = MockProvider::new("unused").with_queue(["date,event\n1901,a", "date,event\n1923,b"]);
        let config = PipelineConfig {
            max_chunk_size: 5,
            ..Default::default()
        };
        let generator = ArtifactGenerator::new(llm, MemoryCache::new(), config);

        let request = GenerationRequest::new("0123456789", "dates", FormatContract::Csv);
        let outcome = generator.generate(&request).await.unwrap();

        assert_eq!(outcome.artifact.as_csv(), Some("date,event\n1901,a\n1923,b"));
    }

    #[tokio::test]
    async fn test_all_chunks_unparseable_fails_and_is_not_cached() {
        let cache = MemoryCache::new();
        let llm = MockProvider::new("no data here");
        let generator = ArtifactGenerator::new(llm, cache.clone(), PipelineConfig::default());

        let request = GenerationRequest::new("text", "titles", FormatContract::records(["title"]));
        let result = generator.generate(&request).await;

        assert!(matches!(result, Err(ExtractorError::NoStructuredData { chunks: 1 })));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_fails_job() {
        let llm = MockProvider::new("a\n1").fail_when_contains("PDF Text");
        let generator = ArtifactGenerator::new(llm, MemoryCache::new(), PipelineConfig::default());

        let request = GenerationRequest::new("text", "dates", FormatContract::Csv);
        let result = generator.generate(&request).await;

        assert!(matches!(result, Err(ExtractorError::Llm(_))));
    }

    #[tokio::test]
    async fn test_generation_timeout() {
        let llm = MockProvider::new("a\n1").with_delay(Duration::from_millis(1500));
        let config = PipelineConfig {
            generation_timeout_secs: 1,
            ..Default::default()
        };
        let generator = ArtifactGenerator::new(llm, MemoryCache::new(), config);

        let request = GenerationRequest::new("text", "dates", FormatContract::Csv);
        let result = generator.generate(&request).await;

        assert!(matches!(result, Err(ExtractorError::Timeout(1))));
    }

    #[tokio::test]
    async fn test_empty_text_rejected_without_calls() {
        let llm = MockProvider::new("a\n1");
        let generator = ArtifactGenerator::new(llm.clone(), MemoryCache::new(), PipelineConfig::default());

        let request = GenerationRequest::new("  \n ", "dates", FormatContract::Csv);
        assert!(matches!(generator.generate(&request).await, Err(ExtractorError::EmptyText)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_detects_plain_id_column() {
        let llm = MockProvider::new(
            r#"```json
[
  {"item_index": 0, "matched_uuid": "R1", "confidence_score": "92%", "match_reason": "same subject", "why_lesser": "no diagrams"},
  {"item_index": 1, "matched_uuid": "R2", "confidence_score": 0.7, "match_reason": "energy in plants"},
  {"pdf_summary": "An introductory biology text."}
]
```"#,
        );
        let reconciler = Reconciler::new(llm.clone(), PipelineConfig::default());

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("id"))
            .await
            .unwrap();

        assert_eq!(result.identifier_column, "id");
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].record["title"], "Cells");
        assert_eq!(result.matches[0].matched_id.as_deref(), Some("R1"));
        assert_eq!(result.matches[0].confidence.value(), 92);
        assert_eq!(result.matches[0].gap_notes.as_deref(), Some("no diagrams"));
        assert_eq!(result.matches[1].matched_id.as_deref(), Some("R2"));
        assert_eq!(result.matches[1].confidence.value(), 70);
        assert_eq!(result.summary.as_deref(), Some("An introductory biology text."));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_reconcile_without_identifier_column_makes_no_calls() {
        let llm = MockProvider::new("[]");
        let reconciler = Reconciler::new(llm.clone(), PipelineConfig::default());
        let reference = ReferenceSet::new(
            vec!["guide".to_string(), "title".to_string()],
            vec![rec(&[("guide", "g"), ("title", "t")])],
        );

        let result = reconciler.reconcile(&extracted_records(), &reference).await;

        match result {
            Err(ExtractorError::MissingIdentifierColumn { columns }) => {
                assert_eq!(columns, vec!["guide".to_string(), "title".to_string()]);
            }
            other => panic!("expected MissingIdentifierColumn, got {:?}", other),
        }
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reconcile_unparseable_response_fails_whole_batch() {
        let llm = MockProvider::new("I matched them all, trust me.");
        let reconciler = Reconciler::new(llm, PipelineConfig::default());

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("uuid"))
            .await;

        match result {
            Err(ExtractorError::Matching { raw_response, .. }) => {
                assert_eq!(raw_response, "I matched them all, trust me.");
            }
            other => panic!("expected Matching error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reconcile_preserves_order_when_model_reorders() {
        let llm = MockProvider::new(
            r#"[{"item_index": 1, "matched_uuid": "R2", "confidence_score": 80},
                {"item_index": 0, "matched_uuid": "R1", "confidence_score": 90}]"#,
        );
        let reconciler = Reconciler::new(llm, PipelineConfig::default());

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("uuid"))
            .await
            .unwrap();

        assert_eq!(result.matches[0].record["title"], "Cells");
        assert_eq!(result.matches[0].matched_id.as_deref(), Some("R1"));
        assert_eq!(result.matches[1].matched_id.as_deref(), Some("R2"));
        assert_eq!(result.summary, None);
    }

    #[tokio::test]
    async fn test_reconcile_discards_invented_identifier() {
        let llm = MockProvider::new(
            r#"[{"item_index": 0, "matched_uuid": "R77", "confidence_score": 95}]"#,
        );
        let reconciler = Reconciler::new(llm, PipelineConfig::default());

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("uuid"))
            .await
            .unwrap();

        assert_eq!(result.matches[0].matched_id, None);
        assert_eq!(result.matches[0].confidence.value(), 0);
        assert_eq!(result.discarded_ids, vec!["R77".to_string()]);
        assert!(result.matches[1].rationale.contains("No answer"));
    }

    #[tokio::test]
    async fn test_reconcile_respects_limits() {
        let llm = MockProvider::new(r#"[{"item_index": 0, "matched_uuid": "R1"}]"#);
        let config = PipelineConfig {
            reference_row_limit: 1,
            extracted_record_limit: 1,
            ..Default::default()
        };
        let reconciler = Reconciler::new(llm.clone(), config);

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("uuid"))
            .await
            .unwrap();

        assert_eq!(result.reference_rows_sent, 1);
        assert_eq!(result.records_sent, 1);
        assert!(result.matches[1].rationale.contains("record limit"));

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Cell biology"));
        assert!(!prompt.contains("Plant energy"));
        assert!(!prompt.contains("Photosynthesis"));
    }

    #[tokio::test]
    async fn test_reconcile_per_record_mode() {
        let llm = MockProvider::new("unused").with_queue([
            r#"[{"matched_uuid": "R1", "confidence_score": "88"}]"#,
            r#"[{"matched_uuid": null, "match_reason": "nothing similar"}]"#,
        ]);
        let config = PipelineConfig {
            reconcile_mode: ReconcileMode::PerRecord,
            ..Default::default()
        };
        let reconciler = Reconciler::new(llm.clone(), config);

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("uuid"))
            .await
            .unwrap();

        assert_eq!(llm.call_count(), 2);
        assert_eq!(result.matches[0].matched_id.as_deref(), Some("R1"));
        assert_eq!(result.matches[1].matched_id, None);
        assert_eq!(result.matches[1].rationale, "nothing similar");
        assert!(!llm.prompts()[0].contains("pdf_summary"));
    }

    #[tokio::test]
    async fn test_reconcile_per_record_is_all_or_nothing() {
        let llm = MockProvider::new("unused").with_queue([
            r#"[{"matched_uuid": "R1"}]"#,
            "garbled",
        ]);
        let config = PipelineConfig {
            reconcile_mode: ReconcileMode::PerRecord,
            ..Default::default()
        };
        let reconciler = Reconciler::new(llm, config);

        let result = reconciler
            .reconcile(&extracted_records(), &reference_with("uuid"))
            .await;

        assert!(matches!(result, Err(ExtractorError::Matching { .. })));
    }
}
