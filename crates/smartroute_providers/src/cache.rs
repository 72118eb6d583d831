use std::{
    hash::Hasher,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use fxhash::FxHasher64;

const CACHE_FOLDER_ENV_VAR: &str = "SMARTROUTE_CACHE_FOLDER";

/// Remembers successful geocodes so a retried run doesn't pay for them twice.
/// Misses are never cached.
pub trait GeocodeCache {
    fn cache(&self, query: &str, point: geo_types::Point) -> Result<(), anyhow::Error>;

    fn get_cached(&self, query: &str) -> Result<Option<geo_types::Point>, anyhow::Error>;
}

impl<C: GeocodeCache + ?Sized> GeocodeCache for Box<C> {
    fn cache(&self, query: &str, point: geo_types::Point) -> Result<(), anyhow::Error> {
        (**self).cache(query, point)
    }

    fn get_cached(&self, query: &str) -> Result<Option<geo_types::Point>, anyhow::Error> {
        (**self).get_cached(query)
    }
}

pub struct NoCache;

impl GeocodeCache for NoCache {
    fn cache(&self, _query: &str, _point: geo_types::Point) -> Result<(), anyhow::Error> {
        Ok(())
    }

    fn get_cached(&self, _query: &str) -> Result<Option<geo_types::Point>, anyhow::Error> {
        Ok(None)
    }
}

/// One `<hash>.json` file per query holding `[lng, lat]`.
pub struct FileCache {
    folder: PathBuf,
}

impl FileCache {
    pub fn new(folder: impl Into<PathBuf>) -> Result<Self, anyhow::Error> {
        let folder = folder.into();

        if !folder.is_dir() {
            return Err(anyhow::anyhow!(format!(
                "Path {} is not a directory",
                folder.display()
            )));
        }

        Ok(Self { folder })
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let folder = std::env::var(CACHE_FOLDER_ENV_VAR)?;
        Self::new(folder)
    }

    fn file_path(&self, query: &str) -> PathBuf {
        self.folder.join(get_filename(query))
    }
}

fn get_filename(query: &str) -> String {
    let mut hasher = FxHasher64::default();
    hasher.write(query.as_bytes());

    format!("{:016x}.json", hasher.finish())
}

fn read_point(path: &Path) -> Result<geo_types::Point, anyhow::Error> {
    let file = std::fs::File::open(path)?;
    let [lng, lat]: [f64; 2] = serde_json::from_reader(file)?;

    Ok(geo_types::Point::new(lng, lat))
}

impl GeocodeCache for FileCache {
    fn cache(&self, query: &str, point: geo_types::Point) -> Result<(), anyhow::Error> {
        let file = std::fs::File::create(self.file_path(query))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &[point.x(), point.y()])?;
        writer.flush()?;

        Ok(())
    }

    fn get_cached(&self, query: &str) -> Result<Option<geo_types::Point>, anyhow::Error> {
        let file_path = self.file_path(query);

        if !file_path.is_file() {
            return Ok(None);
        }

        read_point(&file_path).map(Some)
    }
}
