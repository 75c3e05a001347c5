//! `generate` command.

use std::io::Write;

use gossim_topology::{GeneratorConfig, LatencyRange, ModelParams, TopologyGenerator, TopologyStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::cli::GenerateArgs;
use crate::error::CliResult;

/// Generates a topology and prints or saves it.
#[derive(Debug, Clone)]
pub struct GenerateCommand {
    store: TopologyStore,
}

impl GenerateCommand {
    /// Creates the command writing into `store`.
    #[must_use]
    pub const fn new(store: TopologyStore) -> Self {
        Self { store }
    }

    /// Runs the command.
    ///
    /// With `--save` the artifact path is printed, otherwise the artifact
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid, generation fails or
    /// the artifact cannot be written.
    pub fn execute<W: Write>(&self, out: &mut W, args: &GenerateArgs) -> CliResult<()> {
        let params = ModelParams::parse(args.model, &args.parameter, args.adjust)?;
        let latency = LatencyRange::new(args.min_latency, args.max_latency)?;
        let config = GeneratorConfig::new(args.nodes, params, latency)
            .with_node_prefix(args.prefix.clone())
            .with_max_attempts(args.max_attempts);
        let generator = TopologyGenerator::new(config)?;

        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let topology = generator.generate(&mut rng)?;

        if args.save {
            let path = self.store.save(&topology, &params)?;
            info!(path = %path.display(), "artifact written");
            writeln!(out, "{}", path.display())?;
        } else {
            writeln!(out, "{}", topology.to_json()?)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gossim_topology::{GenerateError, Model, Topology};
    use test_case::test_case;

    use crate::error::CliError;

    fn args(model: Model, parameter: &str) -> GenerateArgs {
        GenerateArgs {
            nodes: 10,
            model,
            parameter: parameter.to_string(),
            adjust: 0,
            min_latency: 1,
            max_latency: 10,
            prefix: "n".to_string(),
            max_attempts: 100,
            seed: Some(7),
            save: false,
        }
    }

    fn run(args: &GenerateArgs) -> CliResult<String> {
        let mut out = Vec::new();
        GenerateCommand::new(TopologyStore::new("unused")).execute(&mut out, args)?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let a = run(&args(Model::Ba, "2")).expect("generate");
        let b = run(&args(Model::Ba, "2")).expect("generate");
        assert_eq!(a, b);

        let topology = Topology::from_json(&a).expect("decode");
        assert_eq!(topology.nodes().len(), 10);
        assert_eq!(topology.nodes()[0].as_str(), "n-0");
    }

    #[test]
    fn save_writes_into_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut generate = args(Model::Ba, "2");
        generate.save = true;

        let mut out = Vec::new();
        GenerateCommand::new(TopologyStore::new(dir.path()))
            .execute(&mut out, &generate)
            .expect("generate");

        let printed = String::from_utf8(out).expect("utf8");
        let path = std::path::Path::new(printed.trim());
        assert!(path.starts_with(dir.path()));
        assert!(TopologyStore::load(path).is_ok());
    }

    #[test_case(Model::Ba, "two" ; "non numeric degree")]
    #[test_case(Model::Er, "1.5" ; "probability out of range")]
    #[test_case(Model::Ba, "10" ; "degree not below node count")]
    fn rejects_bad_parameters(model: Model, parameter: &str) {
        assert!(matches!(
            run(&args(model, parameter)),
            Err(CliError::Generate(GenerateError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn rejects_zero_latency() {
        let mut generate = args(Model::Ba, "2");
        generate.min_latency = 0;
        assert!(matches!(
            run(&generate),
            Err(CliError::Generate(GenerateError::InvalidConfig(_)))
        ));
    }
}
