//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ontoscan_annotator::AnnotateOptions;

#[derive(Debug, Parser)]
#[command(name = "ontoscan")]
#[command(about = "Ontology term annotator and recommender")]
#[command(version)]
pub struct Cli {
    /// Path to ontoscan.toml
    #[arg(short, long, global = true, env = "ONTOSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the JSON API
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },

    /// Annotate text and print the annotations as JSON
    Annotate {
        #[command(flatten)]
        input: TextInput,

        #[command(flatten)]
        options: AnnotateArgs,
    },

    /// Rank ontologies for a text
    Recommend {
        #[command(flatten)]
        input: TextInput,

        /// Restrict to these ontologies (id or acronym)
        #[arg(long, value_delimiter = ',')]
        ontologies: Vec<String>,

        /// List matched classes per ontology
        #[arg(long)]
        include_classes: bool,
    },

    /// Populate the term cache. Without --instance, rebuild the inactive
    /// instance, export the dictionary and switch to it.
    BuildCache {
        /// Build into this instance prefix only, no export or switch; the
        /// live instance is refused
        #[arg(long)]
        instance: Option<String>,

        /// Only these ontologies (id or acronym), with --instance
        #[arg(long, value_delimiter = ',', requires = "instance")]
        ontologies: Vec<String>,
    },

    /// Export the span-matcher dictionary of a cache instance
    Dictionary {
        /// Instance prefix, defaults to the live one
        #[arg(long)]
        instance: Option<String>,

        /// Output file, overrides dictionary.path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Point readers at another cache instance
    SwitchInstance {
        /// Target prefix, defaults to the inactive one
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct TextInput {
    /// Text to process; read from stdin when neither this nor --file is given
    pub text: Option<String>,

    /// Read the text from a file (invalid UTF-8 is replaced)
    #[arg(long, conflicts_with = "text")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AnnotateArgs {
    /// Restrict to these ontologies (id or acronym)
    #[arg(long, value_delimiter = ',')]
    pub ontologies: Vec<String>,

    /// Keep classes carrying one of these semantic types
    #[arg(long, value_delimiter = ',')]
    pub semantic_types: Vec<String>,

    /// Also accept descendants of the requested semantic types
    #[arg(long)]
    pub semantic_types_hierarchy: bool,

    #[arg(long)]
    pub filter_integers: bool,

    /// Drop spans of at most this many characters
    #[arg(long)]
    pub min_term_size: Option<usize>,

    /// Allow matches inside words
    #[arg(long)]
    pub partial_words: bool,

    #[arg(long)]
    pub no_synonyms: bool,

    #[arg(long)]
    pub longest_only: bool,

    /// Ancestor levels to attach (0 = off)
    #[arg(long, default_value_t = 0)]
    pub levels: u32,

    /// Attach cross-ontology mappings
    #[arg(long)]
    pub mappings: bool,
}

impl AnnotateArgs {
    pub fn to_options(&self) -> AnnotateOptions {
        AnnotateOptions {
            ontologies: self.ontologies.clone(),
            semantic_types: self.semantic_types.clone(),
            use_semantic_types_hierarchy: self.semantic_types_hierarchy,
            filter_integers: self.filter_integers,
            min_term_size: self.min_term_size,
            whole_word_only: !self.partial_words,
            with_synonyms: !self.no_synonyms,
            longest_only: self.longest_only,
            expand_hierarchy_levels: self.levels,
            expand_with_mappings: self.mappings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "ontoscan", "annotate", "Data Storage",
            "--ontologies", "BRO,GO", "--longest-only", "--levels", "3", "--no-synonyms",
        ])
        .unwrap();

        let Command::Annotate { input, options } = cli.command else {
            panic!("expected annotate");
        };
        assert_eq!(input.text.as_deref(), Some("Data Storage"));

        let opts = options.to_options();
        assert_eq!(opts.ontologies, vec!["BRO", "GO"]);
        assert!(opts.longest_only);
        assert!(!opts.with_synonyms);
        assert!(opts.whole_word_only);
        assert_eq!(opts.expand_hierarchy_levels, 3);
    }

    #[test]
    fn test_defaults_match_library_defaults() {
        let cli = Cli::try_parse_from(["ontoscan", "annotate", "x"]).unwrap();
        let Command::Annotate { options, .. } = cli.command else {
            panic!("expected annotate");
        };
        assert_eq!(options.to_options(), AnnotateOptions::default());
    }

    #[test]
    fn test_text_and_file_conflict() {
        assert!(Cli::try_parse_from(["ontoscan", "annotate", "x", "--file", "a.txt"]).is_err());
    }

    #[test]
    fn test_build_cache_ontologies_require_instance() {
        assert!(Cli::try_parse_from(["ontoscan", "build-cache", "--ontologies", "BRO"]).is_err());
        let cli = Cli::try_parse_from(["ontoscan", "build-cache", "--instance", "c2:", "--ontologies", "BRO"]).unwrap();
        assert!(matches!(cli.command, Command::BuildCache { instance: Some(_), .. }));
    }
}
