// Library root
// -----------
// The `quickpin` binary is a thin shell over these modules:
// - `api`: blocking HTTP client for the QuickPin endpoints and payloads.
// - `credentials`: token short-circuit and prompting for URL and auth that
//   neither a flag nor its environment variable supplied.
// - `submit`: reads the input file and drives the throttled submission loop.
// - `ui`: terminal prompts and the progress bar.
// - `cli`: clap definitions and the per-command glue.
// - `logging`: tracing subscriber setup.
pub mod api;
pub mod cli;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod submit;
pub mod ui;

pub use error::{QpiError, Result};
