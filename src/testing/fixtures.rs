//! Pre-built datasets for common loading scenarios.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// First part of the mortgage dataset.
pub const MORTGAGE_PART_1: &str = "ID,sale_price,location\n\
100521,120000,1\n\
100529,95000,2\n\
100533,134000,3\n";

/// Second part of the mortgage dataset.
pub const MORTGAGE_PART_2: &str = "ID,sale_price,location\n\
100541,210000,1\n\
100550,87000,2\n";

/// Mortgage rows without a header line.
pub const MORTGAGE_NO_HEADER: &str = "100521,120000,1\n100529,95000,2\n100533,134000,3\n";

/// A one-column table.
pub const SINGLE_COLUMN: &str = "sale_price\n120000\n95000\n134000\n";

/// First part of a JSON-lines time series.
pub const SERIES_PART_1: &str = "{\"timestamp\": \"2020-01-01 00:00:00\", \"value\": 10}\n\
{\"timestamp\": \"2020-01-01 01:00:00\", \"value\": 12}\n";

/// Second part of a JSON-lines time series.
pub const SERIES_PART_2: &str = "{\"timestamp\": \"2020-01-01 02:00:00\", \"value\": 9}\n\
{\"timestamp\": \"2020-01-01 03:00:00\", \"value\": 15}\n";

/// A temporary directory to lay part files out in. Removed on drop.
///
/// # Example
///
/// ```
/// use shardframe::testing::TempDataset;
///
/// # fn main() -> anyhow::Result<()> {
/// let data = TempDataset::new()?;
/// let part = data.write("out/part-00000.csv", "a,b\n1,2\n")?;
/// assert!(part.is_file());
/// # Ok(())
/// # }
/// ```
pub struct TempDataset {
    dir: TempDir,
}

impl TempDataset {
    /// # Errors
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new().context("create temporary dataset directory")?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `relative` inside the dataset, whether or not it exists.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the file or its parents cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> anyhow::Result<PathBuf> {
        self.write_bytes(relative, contents.as_bytes())
    }

    /// Write raw bytes to `relative`, creating parent directories.
    ///
    /// # Errors
    /// Returns an error if the file or its parents cannot be written.
    pub fn write_bytes(&self, relative: &str, contents: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write `contents` gzip-compressed to `relative`.
    ///
    /// # Errors
    /// Returns an error if compression or the write fails.
    #[cfg(feature = "compression-gzip")]
    pub fn write_gzip(&self, relative: &str, contents: &str) -> anyhow::Result<PathBuf> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(contents.as_bytes())?;
        let bytes = enc.finish().context("finish gzip stream")?;
        self.write_bytes(relative, &bytes)
    }
}

/// The mortgage sample laid out on disk:
///
/// ```text
/// csv/morgage1.csv        ID,sale_price,location (3 rows, includes ID 100529)
/// csv/morgage2.csv        same columns (2 rows)
/// no_header.csv           the first part without its header line
/// single_column.csv       sale_price only
/// json/part-00000.json    timestamp,value records
/// json/part-00001.json
/// json/_SUCCESS           empty marker file, skipped by directory loads
/// ```
pub struct MortgageFixture {
    data: TempDataset,
}

impl MortgageFixture {
    /// # Errors
    /// Returns an error if any fixture file cannot be written.
    pub fn new() -> anyhow::Result<Self> {
        let data = TempDataset::new()?;
        data.write("csv/morgage1.csv", MORTGAGE_PART_1)?;
        data.write("csv/morgage2.csv", MORTGAGE_PART_2)?;
        data.write("no_header.csv", MORTGAGE_NO_HEADER)?;
        data.write("single_column.csv", SINGLE_COLUMN)?;
        data.write("json/part-00000.json", SERIES_PART_1)?;
        data.write("json/part-00001.json", SERIES_PART_2)?;
        data.write("json/_SUCCESS", "")?;
        Ok(Self { data })
    }

    #[must_use]
    pub fn dataset(&self) -> &TempDataset {
        &self.data
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.data.root()
    }

    #[must_use]
    pub fn csv_dir(&self) -> PathBuf {
        self.data.path("csv")
    }

    #[must_use]
    pub fn first_part(&self) -> PathBuf {
        self.data.path("csv/morgage1.csv")
    }

    #[must_use]
    pub fn no_header(&self) -> PathBuf {
        self.data.path("no_header.csv")
    }

    #[must_use]
    pub fn single_column(&self) -> PathBuf {
        self.data.path("single_column.csv")
    }

    #[must_use]
    pub fn json_dir(&self) -> PathBuf {
        self.data.path("json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mortgage_layout() -> anyhow::Result<()> {
        let f = MortgageFixture::new()?;
        assert!(f.first_part().is_file());
        assert!(f.no_header().is_file());
        assert!(f.json_dir().join("_SUCCESS").is_file());
        assert_eq!(fs::read_dir(f.csv_dir())?.count(), 2);
        Ok(())
    }
}
