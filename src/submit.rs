// Submission loop: turn the lines of an input file into profiles and send
// them one batch at a time, sleeping between batches. A failed batch is
// reported and counted; the loop carries on with the next one.

use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use indicatif::ProgressBar;
use tracing::{debug, warn};

use crate::api::{ApiClient, Profile, Site};
use crate::error::{QpiError, Result};

/// How each input line identifies a profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierKind {
    Username,
    UpstreamId,
}

impl IdentifierKind {
    pub fn profile(self, identifier: impl Into<String>, site: Site) -> Profile {
        match self {
            IdentifierKind::Username => Profile::with_username(identifier, site),
            IdentifierKind::UpstreamId => Profile::with_upstream_id(identifier, site),
        }
    }
}

/// Anything that can deliver a batch of profiles. `ApiClient` is the real
/// one; tests plug in a recorder.
pub trait Submitter {
    fn submit(&self, profiles: &[Profile], stub: bool) -> Result<String>;
}

impl Submitter for ApiClient {
    fn submit(&self, profiles: &[Profile], stub: bool) -> Result<String> {
        self.submit_profiles(profiles, stub)
    }
}

#[derive(Debug, Clone)]
pub struct SubmitOptions {
    pub interval: Duration,
    /// Profiles per request. Zero is treated as one.
    pub chunk_size: usize,
    pub stub: bool,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        SubmitOptions {
            interval: Duration::from_secs(5),
            chunk_size: 1,
            stub: false,
        }
    }
}

/// What happened over one run of the loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub requests: usize,
    pub submitted: usize,
    pub failed: usize,
    /// Response bodies of the successful requests, in order.
    pub responses: Vec<String>,
}

/// Read `path` and return its non-empty lines, trimmed.
pub fn read_identifiers(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::InvalidData => QpiError::InvalidEncoding {
            path: path.to_path_buf(),
            source,
        },
        _ => QpiError::ReadInput {
            path: path.to_path_buf(),
            source,
        },
    })?;
    Ok(parse_identifiers(&text))
}

pub fn parse_identifiers(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Send `profiles` in order, `options.chunk_size` at a time. `sleep` is
/// called with the interval between consecutive requests, never after the
/// last one. A rejected token stops the run with `Unauthorized`; any other
/// failure is reported and counted.
pub fn run<S, F>(
    submitter: &S,
    profiles: &[Profile],
    options: &SubmitOptions,
    progress: &ProgressBar,
    mut sleep: F,
) -> Result<SubmissionReport>
where
    S: Submitter + ?Sized,
    F: FnMut(Duration),
{
    let chunk_size = options.chunk_size.max(1);
    let mut report = SubmissionReport::default();

    for (index, chunk) in profiles.chunks(chunk_size).enumerate() {
        if index > 0 {
            sleep(options.interval);
        }

        let start = index * chunk_size;
        let end = start + chunk.len();
        progress.set_message(format!("Requesting {start} - {end}"));
        progress.suspend(|| eprintln!("Requesting {start} - {end}"));
        debug!(start, end, first = chunk[0].identifier(), "requesting");

        report.requests += 1;
        match submitter.submit(chunk, options.stub) {
            Ok(body) => {
                debug!(start, end, %body, "submitted");
                report.submitted += chunk.len();
                report.responses.push(body);
            }
            Err(err @ QpiError::Unauthorized { .. }) => {
                progress.finish_and_clear();
                return Err(err);
            }
            Err(err) => {
                // Walk the source chain so transport causes reach the log.
                let err = anyhow::Error::from(err);
                progress.suspend(|| {
                    warn!(start, end, error = %format_args!("{err:#}"), "submission failed")
                });
                report.failed += chunk.len();
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(report)
}
