//! `platform` commands

use std::io::Write;

use crate::cli::PlatformAction;
use crate::error::Result;

/// Container-image name of a machine architecture.
pub fn arch_name(machine: &str) -> &str {
    match machine {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        other => other,
    }
}

pub fn run(action: PlatformAction, out: &mut impl Write) -> Result<()> {
    match action {
        PlatformAction::Arch => write!(out, "{}", arch_name(std::env::consts::ARCH))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("x86_64", "amd64")]
    #[case("aarch64", "arm64")]
    #[case("custom", "custom")]
    fn test_arch_name(#[case] machine: &str, #[case] expected: &str) {
        assert_eq!(arch_name(machine), expected);
    }
}
