/*!
Enumerated option values shared by the build / package / release groups.

Each enum derives `clap::ValueEnum`, so its variants become the `choices`
of the option in the extracted command tree (and thus the values the
generated completion offers after `--target`, `--arch`, `--format`, ...).
*/

use std::fmt;

use clap::ValueEnum;

/// Canonical CLI spelling of a value-enum variant.
fn value_name<T: ValueEnum>(v: &T) -> String {
    v.to_possible_value()
        .map(|pv| pv.get_name().to_string())
        .unwrap_or_default()
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arch {
    #[value(name = "x86_64")]
    X86_64,
    Arm64,
    Aarch64,
    I386,
}

/// Tabular output selection for listing commands.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PackageFormat {
    Crate,
    Tarball,
    Zip,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum PublishTarget {
    CratesIo,
    Github,
    Docker,
    #[default]
    All,
}

macro_rules! display_as_value {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&value_name(self))
            }
        })*
    };
}

display_as_value!(Platform, Arch, OutputFormat, PackageFormat, PublishTarget);

/* --------------------------------- Tests ---------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spellings_match_cli_values() {
        assert_eq!(Arch::X86_64.to_string(), "x86_64");
        assert_eq!(Arch::I386.to_string(), "i386");
        assert_eq!(PublishTarget::CratesIo.to_string(), "crates-io");
        assert_eq!(Platform::Darwin.to_string(), "darwin");
    }

    #[test]
    fn declaration_order_is_choice_order() {
        let names: Vec<String> = OutputFormat::value_variants()
            .iter()
            .map(|v| v.to_string())
            .collect();
        assert_eq!(names, vec!["table", "json", "yaml"]);
    }

    #[test]
    fn parse_from_cli_spelling() {
        assert_eq!(Arch::from_str("aarch64", true), Ok(Arch::Aarch64));
        assert!(Platform::from_str("beos", true).is_err());
    }
}
