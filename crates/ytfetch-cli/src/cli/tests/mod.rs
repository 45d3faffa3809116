//! CLI parse and routing tests.

use super::{Cli, Route};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}
