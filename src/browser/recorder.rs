// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response recorder
//!
//! Writes responses to a directory for later inspection. Each response gets
//! three files (`NN-STATUS-slug.ext`, `...-request.txt`, `...-response.txt`)
//! and a line in `url_response_match.txt` mapping the URL to the file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use crate::error::Result;
use crate::http::{headers, Request, Response};

/// Name of the index file
pub const MATCH_INDEX: &str = "url_response_match.txt";

/// Saves responses into a directory
#[derive(Debug)]
pub struct ResponseRecorder {
    dir: PathBuf,
    counter: AtomicUsize,
}

impl ResponseRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save one exchange, returning the path of the body file
    pub fn save(&self, request: &Request, response: &Response, warning: bool) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        let filename = format!(
            "{:02}-{}-{}{}",
            counter,
            response.status_code(),
            slug(response),
            extension(response.mime().as_deref())
        );
        let body_path = self.dir.join(&filename);

        let mut request_dump = format!("{} {}\n\n\n", request.method, request.url);
        for (name, value) in request.headers.iter() {
            request_dump.push_str(&format!("{}: {}\n", name, value.to_str().unwrap_or("<binary>")));
        }
        if let Some(body) = request.body_text() {
            request_dump.push_str(&format!("\n\n\n{}", body));
        }
        fs::write(self.dir.join(format!("{}-request.txt", filename)), request_dump)?;

        let mut response_dump = format!(
            "Time: {:.3}s\n{} {}\n\n\n",
            response.response_time_ms as f64 / 1000.0,
            response.status.as_u16(),
            response.status.canonical_reason().unwrap_or("")
        );
        for (name, value) in response.headers.iter() {
            response_dump.push_str(&format!("{}: {}\n", name, value.to_str().unwrap_or("<binary>")));
        }
        fs::write(self.dir.join(format!("{}-response.txt", filename)), response_dump)?;

        fs::write(&body_path, &response.body)?;

        let mut index = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(MATCH_INDEX))?;
        writeln!(
            index,
            "# {} {} {}",
            response.status.as_u16(),
            response.status.canonical_reason().unwrap_or(""),
            response.header(headers::CONTENT_TYPE).unwrap_or("")
        )?;
        writeln!(index, "{}\t{}", response.url, filename)?;

        if warning {
            warn!("Response saved to {}", body_path.display());
        } else {
            info!("Response saved to {}", body_path.display());
        }
        Ok(body_path)
    }
}

fn slug(response: &Response) -> String {
    let last = response
        .url
        .path_segments()
        .and_then(|mut segments| segments.next_back().map(str::to_string))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "index".to_string());

    let cleaned: String = last
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(40)
        .collect();
    let cleaned = cleaned.trim_end_matches(|c| c == '_').to_string();
    if cleaned.is_empty() {
        "index".to_string()
    } else {
        cleaned
    }
}

fn extension(mime: Option<&str>) -> &'static str {
    match mime.unwrap_or("") {
        "text/html" | "application/xhtml+xml" => ".html",
        "application/json" => ".json",
        "text/plain" => ".txt",
        "text/xml" | "application/xml" => ".xml",
        "text/csv" => ".csv",
        "application/pdf" => ".pdf",
        _ => "",
    }
}
