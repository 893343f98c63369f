use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use sgp4::Elements;

use crate::predict::error::PredictError;
use crate::predict::sgp4_engine::{EngineConfig, Sgp4Engine};
use crate::predict::types::SatelliteInfo;

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub elements: Elements,
}

impl TleEntry {
    /// Builds a fresh engine instance. The tracker wants one per responsibility.
    pub fn engine(&self, config: EngineConfig) -> Result<Sgp4Engine, PredictError> {
        Sgp4Engine::new(self.info.clone(), self.elements.clone(), config)
    }
}

pub struct TleLoader {
    tle_path: PathBuf,
    satellites: BTreeMap<u32, TleEntry>,
}

impl TleLoader {
    pub fn new(tle_path: PathBuf) -> Self {
        Self {
            tle_path,
            satellites: BTreeMap::new(),
        }
    }

    /// Load a TLE file, or every `.tle`/`.txt` file in a directory
    pub fn load_all(&mut self) -> Result<(), PredictError> {
        self.satellites.clear();

        if self.tle_path.is_file() {
            let path = self.tle_path.clone();
            for entry in parse_tle_file(&path)? {
                self.satellites.insert(entry.info.norad_id, entry);
            }
            return self.ensure_loaded();
        }

        for entry in fs::read_dir(&self.tle_path)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let is_tle = path
                .extension()
                .map(|ext| ext == "tle" || ext == "txt")
                .unwrap_or(false);
            if !is_tle {
                continue;
            }
            match parse_tle_file(&path) {
                Ok(entries) => {
                    for tle_entry in entries {
                        self.satellites.insert(tle_entry.info.norad_id, tle_entry);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                    // Continue with other files
                }
            }
        }

        self.ensure_loaded()
    }

    fn ensure_loaded(&self) -> Result<(), PredictError> {
        if self.satellites.is_empty() {
            return Err(PredictError::NoSatellites);
        }
        log::info!(
            "Loaded {} satellites from {}",
            self.satellites.len(),
            self.tle_path.display()
        );
        Ok(())
    }

    pub fn satellites(&self) -> impl Iterator<Item = &TleEntry> {
        self.satellites.values()
    }

    /// Looks a satellite up by NORAD id or by case-insensitive name.
    pub fn find(&self, query: &str) -> Result<&TleEntry, PredictError> {
        let query = query.trim();
        if let Ok(id) = query.parse::<u32>() {
            if let Some(entry) = self.satellites.get(&id) {
                return Ok(entry);
            }
        }
        self.satellites
            .values()
            .find(|e| e.info.name.eq_ignore_ascii_case(query))
            .ok_or_else(|| PredictError::SatelliteNotFound(query.to_string()))
    }
}

fn parse_tle_file(path: &Path) -> Result<Vec<TleEntry>, PredictError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    parse_tle_content(&content, &filename)
}

pub fn parse_tle_content(content: &str, source: &str) -> Result<Vec<TleEntry>, PredictError> {
    let mut results = Vec::new();

    for (name, line1, line2) in parse_multi_tle(content) {
        let elements = Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            .map_err(|e| PredictError::InvalidTle {
                file: source.to_string(),
                message: e.to_string(),
            })?;

        let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        results.push(TleEntry {
            info: SatelliteInfo {
                name: sat_name,
                norad_id: elements.norad_id as u32,
                tle_source: source.to_string(),
            },
            elements,
        });
    }

    Ok(results)
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            // 2-line TLE (no name)
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            // 3-line TLE (with name)
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
