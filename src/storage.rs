//! Company output directory and per-year raw text storage.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only store for one company's extracted page text.
///
/// Layout: `{data_dir}/{company_with_underscores}/webpage_content_{year}.txt`
/// per year, with the summary CSV beside them. Text files are append-only
/// so an interrupted run leaves valid prefixes behind.
#[derive(Debug, Clone)]
pub struct CompanyStore {
    company: String,
    company_dir: PathBuf,
}

impl CompanyStore {
    /// Create a store rooted under `data_dir` for the company.
    pub fn new(data_dir: &Path, company: &str) -> Self {
        Self {
            company: company.to_string(),
            company_dir: data_dir.join(company.replace(' ', "_")),
        }
    }

    /// Create the company directory if missing.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.company_dir)
    }

    /// The company's output directory.
    pub fn company_dir(&self) -> &Path {
        &self.company_dir
    }

    /// Path of the raw text file for a year.
    pub fn page_text_path(&self, year: i32) -> PathBuf {
        self.company_dir
            .join(format!("webpage_content_{}.txt", year))
    }

    /// Path of the summary CSV.
    pub fn counts_csv_path(&self) -> PathBuf {
        self.company_dir
            .join(format!("{}_counts.csv", self.company.replace(' ', "_")))
    }

    /// Append one page's extracted text to the year's store.
    pub fn append_page_text(&self, year: i32, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.page_text_path(year))?;
        file.write_all(text.as_bytes())?;
        file.write_all(b"\n")?;
        Ok(())
    }
}
