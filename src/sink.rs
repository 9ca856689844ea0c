use crate::company::Company;
use crate::error::SinkError;
use crate::records::{OutputFile, Record};
use crate::utils::sanitize_filename;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// Append-only destination for extracted records
pub trait ResultSink {
    /// Make the company's files ready for appending
    fn prepare(&mut self, company: &Company, files: &[OutputFile]) -> Result<(), SinkError>;

    /// Append records and make them durable; returns the number of rows written
    fn append<R: Record>(&mut self, company: &Company, records: &[R]) -> Result<usize, SinkError>;

    /// Release any resources held for the company
    fn release(&mut self, _company: &Company) {}
}

/// Writes one CSV file per company and output file under a root directory
pub struct CsvSink {
    root: PathBuf,
    writers: HashMap<(Company, OutputFile), csv::Writer<File>>,
    headers_written: HashSet<(Company, OutputFile)>,
}

impl CsvSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writers: HashMap::new(),
            headers_written: HashSet::new(),
        }
    }

    /// Directory holding a company's files
    pub fn company_dir(&self, company: &Company) -> PathBuf {
        self.root.join(sanitize_filename(&company.name))
    }

    pub fn file_path(&self, company: &Company, file: OutputFile) -> PathBuf {
        self.company_dir(company).join(file.file_name())
    }

    fn open(path: &Path) -> Result<File, SinkError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Setup {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl ResultSink for CsvSink {
    fn prepare(&mut self, company: &Company, files: &[OutputFile]) -> Result<(), SinkError> {
        let dir = self.company_dir(company);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| SinkError::Setup {
                path: dir.clone(),
                source,
            })?;
            ::log::info!("Directory '{}' created", dir.display());
        }

        for &file in files {
            let key = (company.clone(), file);
            if self.writers.contains_key(&key) {
                continue;
            }

            let path = dir.join(file.file_name());
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Self::open(&path)?);

            if self.headers_written.insert(key.clone()) {
                writer.write_record(file.headers())?;
                writer.flush()?;
            }

            ::log::debug!("Opened {} for appending", path.display());
            self.writers.insert(key, writer);
        }
        Ok(())
    }

    fn append<R: Record>(&mut self, company: &Company, records: &[R]) -> Result<usize, SinkError> {
        let writer = self
            .writers
            .get_mut(&(company.clone(), R::FILE))
            .ok_or_else(|| SinkError::NotPrepared(R::FILE.file_name().to_string()))?;

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(records.len())
    }

    fn release(&mut self, company: &Company) {
        self.writers.retain(|(owner, _), _| owner != company);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_review_page;
    use crate::parsers::review::fixtures::review_block;
    use crate::records::{InterviewRecord, ReviewRecord, SalaryRecord, Sentiment};
    use crate::renderer::RenderedPage;

    fn acme() -> Company {
        Company::new("Acme", "E123")
    }

    #[test]
    fn test_prepare_creates_directory_and_headers() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Salaries]).unwrap();

        let path = dir.path().join("Acme").join("salaries.csv");
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Job Title,Total Pay,Base,Additional\n"
        );
    }

    #[test]
    fn test_append_flushes_each_write() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Salaries]).unwrap();

        let rows = vec![SalaryRecord {
            job_title: Some("Engineer".to_string()),
            total_pay: Some("$100K".to_string()),
            base: Some("$90K".to_string()),
            additional: None,
        }];
        assert_eq!(sink.append(&acme(), &rows).unwrap(), 1);

        // Visible on disk while the writer is still open
        let text = fs::read_to_string(sink.file_path(&acme(), OutputFile::Salaries)).unwrap();
        assert_eq!(text, "Job Title,Total Pay,Base,Additional\nEngineer,$100K,$90K,\n");
    }

    #[test]
    fn test_empty_append_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Interviews]).unwrap();

        let none: Vec<InterviewRecord> = Vec::new();
        assert_eq!(sink.append(&acme(), &none).unwrap(), 0);
        let text = fs::read_to_string(sink.file_path(&acme(), OutputFile::Interviews)).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_append_without_prepare_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        let result = sink.append(&acme(), &[SalaryRecord::default()]);
        assert!(matches!(result, Err(SinkError::NotPrepared(_))));
    }

    #[test]
    fn test_existing_file_is_appended_not_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let company_dir = dir.path().join("Acme");
        fs::create_dir_all(&company_dir).unwrap();
        fs::write(company_dir.join("salaries.csv"), "old row\n").unwrap();

        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Salaries]).unwrap();

        let text = fs::read_to_string(company_dir.join("salaries.csv")).unwrap();
        assert_eq!(text, "old row\nJob Title,Total Pay,Base,Additional\n");
    }

    #[test]
    fn test_header_written_once_per_process() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Salaries]).unwrap();
        sink.release(&acme());
        sink.prepare(&acme(), &[OutputFile::Salaries]).unwrap();

        let text = fs::read_to_string(sink.file_path(&acme(), OutputFile::Salaries)).unwrap();
        assert_eq!(text.matches("Job Title").count(), 1);
    }

    #[test]
    fn test_setup_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the company directory should go
        fs::write(dir.path().join("Acme"), "not a directory").unwrap();

        let mut sink = CsvSink::new(dir.path());
        let result = sink.prepare(&acme(), &[OutputFile::Reviews]);
        assert!(matches!(result, Err(SinkError::Setup { .. })));
    }

    #[test]
    fn test_review_row_reads_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Reviews]).unwrap();

        let review = ReviewRecord {
            rating: Some("4.5".to_string()),
            title: Some("Great place".to_string()),
            location: Some("Austin, TX".to_string()),
            recommend: Some(Sentiment::Approve),
            ceo_approval: Some(Sentiment::NoOpinion),
            con: Some("Says \"busy\" a lot".to_string()),
            work_life_balance: Some(4),
            ..ReviewRecord::default()
        };
        sink.append(&acme(), std::slice::from_ref(&review)).unwrap();

        let mut reader =
            csv::Reader::from_path(sink.file_path(&acme(), OutputFile::Reviews)).unwrap();
        let rows: Vec<ReviewRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![review]);
    }

    #[test]
    fn test_extracted_reviews_read_back_identically() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path());
        sink.prepare(&acme(), &[OutputFile::Reviews]).unwrap();

        let page = RenderedPage {
            url: "https://www.glassdoor.com/Reviews/Acme-Reviews-E123_P1.htm".to_string(),
            html: format!(
                "<html><body>{}{}</body></html>",
                review_block("4.5", "Great place", &["approve", "none", "disapprove"]),
                review_block("2.0", "Hard, but \"fair\"", &["na"])
            ),
            payload: Some(
                r#"window.appCache={"reviews":[
                    {"reviewId":1,"ratingWorkLifeBalance":4,"ratingCareerOpportunities":3},
                    {"reviewId":2,"ratingWorkLifeBalance":2}
                ]}"#
                .to_string(),
            ),
        };
        let (_, reviews) = parse_review_page(&page);
        assert_eq!(reviews.len(), 2);
        assert_eq!(sink.append(&acme(), &reviews).unwrap(), 2);

        let mut reader =
            csv::Reader::from_path(sink.file_path(&acme(), OutputFile::Reviews)).unwrap();
        let rows: Vec<ReviewRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, reviews);
        assert_eq!(rows[0].ceo_approval, Some(Sentiment::NoOpinion));
        assert_eq!(rows[0].career_opportunities, Some(3));
        assert_eq!(rows[1].work_life_balance, Some(2));
    }
}
