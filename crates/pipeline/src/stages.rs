//! Stage Orchestration
//!
//! Stages run strictly in order and communicate only through files. Each
//! stage reads its inputs fully, and its outputs are only renamed into place
//! once completely written.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Stage, StageContext};
use data_cleaner::{Cleaner, CleaningReport};
use feature_engine::{FeatureEngineer, FeatureReport};
use feature_selector::{FeatureSelector, SelectionReport};
use listing_ingest::{ingest_json_lines, IngestSummary};
use listing_table::{read_csv, write_pair};
use tracing::info;

/// Counts gathered by the transform stage
#[derive(Debug, Clone)]
pub struct TransformSummary {
    pub cleaning: CleaningReport,
    pub features: FeatureReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Summaries of a full run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub ingest: IngestSummary,
    pub transform: TransformSummary,
    pub selection: SelectionReport,
}

/// Runs the stages against one configuration
pub struct Pipeline<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Scraper log to raw CSV
    pub fn ingest(&self) -> Result<IngestSummary, PipelineError> {
        let paths = &self.config.paths;
        info!("Ingesting {}", paths.raw_json.display());
        ingest_json_lines(&paths.raw_json, &paths.raw_csv).in_stage(Stage::Ingest)
    }

    /// Raw CSV to engineered train/test CSVs
    pub fn transform(&self) -> Result<TransformSummary, PipelineError> {
        let paths = &self.config.paths;
        info!("Transforming {}", paths.raw_csv.display());

        let raw = read_csv(&paths.raw_csv).in_stage(Stage::Transform)?;
        let cleaner = Cleaner::new(self.config.cleaning.clone()).in_stage(Stage::Transform)?;
        let (cleaned, cleaning) = cleaner.clean(raw).in_stage(Stage::Transform)?;

        let engineer = FeatureEngineer::new(self.config.features.clone());
        let (mut train, mut test, features) = engineer.transform_and_split(&cleaned).in_stage(Stage::Transform)?;
        write_pair(&mut train, &paths.train, &mut test, &paths.test).in_stage(Stage::Transform)?;

        info!(
            "Wrote {} train rows to {} and {} test rows to {}",
            train.height(),
            paths.train.display(),
            test.height(),
            paths.test.display()
        );
        Ok(TransformSummary {
            cleaning,
            features,
            train_rows: train.height(),
            test_rows: test.height(),
        })
    }

    /// Train/test CSVs to processed CSVs holding the selected predictors
    pub fn select(&self) -> Result<SelectionReport, PipelineError> {
        let paths = &self.config.paths;
        info!("Selecting features from {}", paths.train.display());

        FeatureSelector::new(self.config.selector.clone())
            .run_files(
                &paths.train,
                &paths.test,
                &paths.processed_train,
                &paths.processed_test,
                &paths.selection_report,
            )
            .in_stage(Stage::Select)
    }

    /// All stages in sequence
    pub fn run(&self) -> Result<RunSummary, PipelineError> {
        let ingest = self.ingest()?;
        let transform = self.transform()?;
        let selection = self.select()?;
        info!(
            "Pipeline finished: {} records, {} features selected",
            ingest.records, selection.n_selected
        );
        Ok(RunSummary {
            ingest,
            transform,
            selection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_table::{column_names, text};
    use serde_json::json;
    use std::fs;
    use std::io::Write;
    use std::path::Path;

    const HOODS: [&str; 4] = ["Gonzaga", "Boqueirão", "Embaré", "Aparecida"];

    /// 100 listings in scraper key order; listing 7 carries the
    /// 120000000 price typo.
    fn write_listings(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = fs::File::create(path).unwrap();
        for i in 0..100u32 {
            let area = 45 + (i * 17) % 120;
            let rooms = 1 + i % 4;
            let price = if i == 7 { 120_000_000 } else { 3_000 * area + 40_000 * rooms + (i % 9) * 1_000 };
            let street = format!("Rua {}, {} - {}, Santos", i, 10 + i, HOODS[(i % 4) as usize]);
            let iptu = if i % 5 == 0 { String::new() } else { format!("R$ {}", 80 + i % 30) };
            let mut record = json!({
                "codigo_anunciante": format!("A{}", i % 13),
                "codigo_zapimoveis": format!("Z{}", i),
                "dtCriacao": format!("{:02}/{:02}/2023", 1 + i % 28, 1 + i % 12),
                "dtColeta": "10/04/2024",
                "imobiliaria": format!("Imobiliária {}", i % 5),
                "nrPreco": format!("R$ {}", price),
                "condominio": format!("R$ {}", 300 + (i % 7) * 50),
                "iptu": iptu,
                "endereco": street,
                "floorSize": format!("{} m²", area),
                "numberOfRooms": rooms.to_string(),
                "numberOfBathroomsTotal": (1 + i % 3).to_string(),
                "numberOfParkingSpaces": (i % 3).to_string(),
                "floorLevel": (i % 20).to_string(),
            });
            let fields = record.as_object_mut().unwrap();
            if i % 2 == 0 {
                fields.insert("pool".into(), json!("Piscina"));
            }
            fields.insert("numberOfSuites".into(), json!((i % 3).to_string()));
            if i % 3 == 0 {
                fields.insert("gym".into(), json!("Academia"));
            }
            writeln!(file, "{}", record).unwrap();
        }
    }

    fn config_in(root: &Path) -> PipelineConfig {
        let config = PipelineConfig::default().rooted_at(root);
        write_listings(&config.paths.raw_json);
        config
    }

    #[test]
    fn test_end_to_end_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let summary = Pipeline::new(&config).run().unwrap();

        assert_eq!(summary.ingest.records, 100);
        assert_eq!(summary.transform.train_rows, 70);
        assert_eq!(summary.transform.test_rows, 30);
        assert_eq!(summary.transform.cleaning.duplicates_dropped, 0);

        let train = read_csv(&config.paths.train).unwrap();
        let test = read_csv(&config.paths.test).unwrap();
        assert_eq!(train.height() + test.height(), 100);
        let mut typo_price = Vec::new();
        for df in [&train, &test] {
            let ids = text(df, "codigo_zapimoveis").unwrap();
            let prices = text(df, "nrPreco").unwrap();
            for (id, price) in ids.into_iter().zip(prices.into_iter()) {
                if id == Some("Z7") {
                    typo_price.push(price.map(str::to_string));
                }
            }
        }
        assert_eq!(typo_price, vec![Some("1200000".to_string())]);

        let processed = read_csv(&config.paths.processed_train).unwrap();
        let mut expected = summary.selection.selected.clone();
        expected.push("nrPreco".to_string());
        assert_eq!(column_names(&processed), expected);
        assert_eq!(processed.height(), 70);
        assert_eq!(read_csv(&config.paths.processed_test).unwrap().height(), 30);
        assert!(config.paths.selection_report.exists());
    }

    #[test]
    fn test_transform_is_byte_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let pipeline = Pipeline::new(&config);
        pipeline.ingest().unwrap();

        pipeline.transform().unwrap();
        let first = (fs::read(&config.paths.train).unwrap(), fs::read(&config.paths.test).unwrap());
        pipeline.transform().unwrap();
        let second = (fs::read(&config.paths.train).unwrap(), fs::read(&config.paths.test).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_stage_keeps_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let pipeline = Pipeline::new(&config);
        pipeline.ingest().unwrap();
        pipeline.transform().unwrap();
        let before = fs::read(&config.paths.train).unwrap();

        // A creation date no format accepts aborts the second transform.
        let raw = fs::read_to_string(&config.paths.raw_csv).unwrap();
        fs::write(&config.paths.raw_csv, raw.replacen("01/01/2023", "ontem", 1)).unwrap();
        let err = pipeline.transform().unwrap_err();
        assert_eq!(err.stage, Stage::Transform);
        assert!(err.to_string().starts_with("error in stage [transform] at "));
        assert_eq!(fs::read(&config.paths.train).unwrap(), before);
    }

    #[test]
    fn test_missing_input_reports_ingest_stage() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().rooted_at(dir.path());
        let err = Pipeline::new(&config).ingest().unwrap_err();
        assert_eq!(err.stage, Stage::Ingest);
        assert!(!config.paths.raw_csv.exists());
    }
}
