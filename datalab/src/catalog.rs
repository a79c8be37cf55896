//! Records, quality findings and edge cases the server starts with.

use datalab_core::{EdgeCase, MiningStrategy, Record, RecordKind, Severity};

fn dataset(
    id: &str,
    name: &str,
    description: &str,
    tags: &[&str],
    (size, records, kind, quality, source): (&str, &str, &str, u32, &str),
) -> Record {
    Record::new(id, RecordKind::Dataset, name, description)
        .with_tags(tags.iter().copied())
        .with_metadata("size", size)
        .with_metadata("records", records)
        .with_metadata("type", kind)
        .with_metadata("quality", quality)
        .with_metadata("source", source)
}

fn pipeline(id: &str, name: &str, description: &str, status: &str, stages: &[&str]) -> Record {
    Record::new(id, RecordKind::Pipeline, name, description)
        .with_tags(["pipeline"])
        .with_metadata("status", status)
        .with_metadata("stages", stages.to_vec())
}

fn document(id: &str, name: &str, section: &str, doc_type: &str) -> Record {
    Record::new(id, RecordKind::Document, name, format!("{} documentation", section))
        .with_tags([section.to_lowercase()])
        .with_metadata("type", doc_type)
        .with_metadata("section", section)
}

pub fn datasets() -> Vec<Record> {
    vec![
        dataset(
            "ds-customer-sentiment",
            "Customer Sentiment Analysis",
            "Retail customer feedback and sentiment scores from Q3 2024",
            &["retail", "sentiment", "nlp"],
            ("2.1 GB", "1.2M", "Text", 92, "S3"),
        ),
        dataset(
            "ds-product-images",
            "Product Catalog Images",
            "High-resolution product images with metadata and annotations",
            &["computer-vision", "retail", "catalog"],
            ("15.3 GB", "450K", "Image", 88, "RDS"),
        ),
        dataset(
            "ds-sales-transactions",
            "Sales Transaction Logs",
            "Transactional data with fraud detection labels",
            &["finance", "fraud-detection", "transactions"],
            ("890 MB", "3.4M", "Structured", 95, "Common Crawl"),
        ),
        dataset(
            "ds-medical-papers",
            "Medical Research Papers",
            "Curated collection of biomedical research abstracts",
            &["medical", "research", "biomedical"],
            ("1.8 GB", "890K", "Text", 97, "Hugging Face"),
        ),
        Record::new(
            "ds-customer-behavior",
            RecordKind::Dataset,
            "Customer Behavior Dataset",
            "E-commerce customer interaction data with purchase history",
        )
        .with_tags(["customer", "behavior", "ecommerce"])
        .with_metadata("size", "2.3 GB"),
        Record::new(
            "ds-product-classification",
            RecordKind::Dataset,
            "Product Image Classification",
            "Labeled product images for multi-class classification",
        )
        .with_tags(["images", "classification", "products"])
        .with_metadata("size", "850 MB"),
    ]
}

pub fn pipelines() -> Vec<Record> {
    vec![
        Record::new(
            "pl-preprocessing",
            RecordKind::Pipeline,
            "Data Preprocessing Pipeline",
            "Automated data cleaning and feature engineering",
        )
        .with_tags(["preprocessing", "automation"])
        .with_metadata("status", "running")
        .with_metadata(
            "stages",
            vec!["Data Ingestion", "Cleaning", "Validation", "Feature Engineering"],
        ),
        pipeline(
            "pl-model-training",
            "Model Training Pipeline",
            "Model preparation, training and evaluation",
            "completed",
            &["Data Prep", "Model Training", "Evaluation", "Model Registry"],
        ),
        pipeline(
            "pl-batch-inference",
            "Batch Inference Pipeline",
            "Offline inference over stored inputs",
            "failed",
            &["Data Load", "Model Load", "Inference", "Output Storage"],
        ),
    ]
}

pub fn documents() -> Vec<Record> {
    vec![
        Record::new(
            "doc-quality-guidelines",
            RecordKind::Document,
            "Dataset Quality Guidelines",
            "Best practices for maintaining data quality",
        )
        .with_tags(["quality", "guidelines"])
        .with_metadata("type", "guide"),
        document("doc-platform-overview", "Platform Overview", "Getting Started", "guide"),
        document("doc-first-dataset", "First Dataset Setup", "Getting Started", "tutorial"),
        document("doc-api-auth", "API Authentication", "Getting Started", "guide"),
        document("doc-browser-guide", "Dataset Browser Guide", "Data Management", "guide"),
        document("doc-quality-metrics", "Data Quality Metrics", "Data Management", "reference"),
        document("doc-synthetic-data", "Synthetic Data Generation", "Data Management", "tutorial"),
        document("doc-pipeline-architecture", "Pipeline Architecture", "ML Pipelines", "guide"),
        document("doc-custom-components", "Custom Components", "ML Pipelines", "tutorial"),
        document("doc-monitoring", "Monitoring & Alerts", "ML Pipelines", "reference"),
    ]
}

fn quality_metric(
    id: &str,
    title: &str,
    description: &str,
    value: u32,
    change: f64,
    status: &str,
) -> Record {
    Record::new(id, RecordKind::QualityMetric, title, description)
        .with_tags(["quality", status])
        .with_metadata("value", value)
        .with_metadata("change", change)
        .with_metadata("status", status)
}

fn quality_issue(
    id: &str,
    dataset: &str,
    issue: &str,
    severity: Severity,
    count: u64,
    reported: &str,
) -> Record {
    Record::new(id, RecordKind::QualityIssue, issue, format!("{} in {}", issue, dataset))
        .with_tags(["quality", severity.as_str()])
        .with_metadata("dataset", dataset)
        .with_metadata("severity", severity.as_str())
        .with_metadata("count", count)
        .with_metadata("reported", reported)
}

pub fn quality_metrics() -> Vec<Record> {
    vec![
        quality_metric(
            "qm-completeness",
            "Data Completeness",
            "Percentage of complete records without missing values",
            94,
            2.1,
            "good",
        ),
        quality_metric(
            "qm-schema-compliance",
            "Schema Compliance",
            "Adherence to defined data schemas and constraints",
            98,
            0.5,
            "excellent",
        ),
        quality_metric(
            "qm-duplicates",
            "Duplicate Detection",
            "Identification and handling of duplicate records",
            87,
            -1.2,
            "warning",
        ),
        quality_metric(
            "qm-label-accuracy",
            "Label Accuracy",
            "Quality of annotations and labeled data",
            91,
            3.4,
            "good",
        ),
    ]
}

pub fn quality_issues() -> Vec<Record> {
    vec![
        quality_issue(
            "qi-missing-labels",
            "Customer Sentiment Analysis",
            "Missing sentiment labels",
            Severity::Medium,
            1249,
            "2 hours ago",
        ),
        quality_issue(
            "qi-corrupted-images",
            "Product Catalog Images",
            "Corrupted image files",
            Severity::High,
            23,
            "4 hours ago",
        ),
        quality_issue(
            "qi-outlier-values",
            "Sales Transaction Logs",
            "Outlier values detected",
            Severity::Low,
            456,
            "1 day ago",
        ),
    ]
}

pub fn edge_cases() -> Vec<EdgeCase> {
    let case = |id: &str,
                strategy,
                severity,
                (title, description, example): (&str, &str, &str),
                confidence,
                (category, dataset, impact): (&str, &str, &str)| EdgeCase {
        id: id.to_string(),
        strategy,
        severity,
        title: title.to_string(),
        description: description.to_string(),
        example: example.to_string(),
        confidence,
        category: category.to_string(),
        dataset: dataset.to_string(),
        impact: impact.to_string(),
    };

    vec![
        case(
            "ec-gender-bias",
            MiningStrategy::BiasDetection,
            Severity::High,
            (
                "Gender Bias in Job Descriptions",
                "Job posting uses gendered language that may discourage certain applicants",
                "We need a rockstar developer who can handle the pressure...",
            ),
            0.89,
            ("Language Bias", "HR Job Postings", "May reduce diversity in applicant pool"),
        ),
        case(
            "ec-ambiguous-intent",
            MiningStrategy::FailureModes,
            Severity::Medium,
            (
                "Ambiguous Intent Classification",
                "Customer query could be interpreted multiple ways",
                "I want to cancel my order... actually, can I change it instead?",
            ),
            0.76,
            (
                "Intent Ambiguity",
                "Customer Support Logs",
                "May lead to incorrect automated responses",
            ),
        ),
        case(
            "ec-sentiment-manipulation",
            MiningStrategy::AdversarialExamples,
            Severity::High,
            (
                "Sentiment Manipulation",
                "Text appears positive but contains subtle negative indicators",
                "This product is absolutely perfect... for someone who enjoys disappointment",
            ),
            0.92,
            (
                "Sarcasm/Irony",
                "Product Reviews",
                "May misclassify sentiment in automated systems",
            ),
        ),
        case(
            "ec-statistical-anomaly",
            MiningStrategy::OutlierDetection,
            Severity::Low,
            (
                "Statistical Anomaly",
                "Data point significantly deviates from expected distribution",
                "Age: 150, Income: $50,000, Occupation: Student",
            ),
            0.95,
            (
                "Data Inconsistency",
                "Demographics Survey",
                "May skew statistical analysis results",
            ),
        ),
    ]
}

/// Every searchable record, edge cases included, in display order.
pub fn records(edge_cases: &[EdgeCase]) -> Vec<Record> {
    let mut records = datasets();
    records.extend(pipelines());
    records.extend(documents());
    records.extend(quality_metrics());
    records.extend(quality_issues());
    records.extend(edge_cases.iter().map(EdgeCase::to_record));
    records
}
