use std::collections::BTreeMap;

/// Environment variables keyed by name. Ordered so that synthesized
/// configurations are deterministic.
pub type EnvironmentMap = BTreeMap<String, String>;

/// A request for launching an external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    program: String,
    args: Vec<String>,
    detached: bool,
    env: Option<EnvironmentMap>,
}

impl SpawnRequest {
    /// Creates a new [`SpawnRequest`] which runs `program` without arguments.
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            detached: false,
            env: None,
        }
    }

    /// Set the ordered arguments passed to the program.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Run the program in its own process group. Aborting a detached process
    /// is not treated as a failure.
    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    /// Set the environment variables added to the inherited environment.
    ///
    /// The given variables override inherited ones with the same name, while
    /// every other inherited variable stays visible to the process. `None`
    /// leaves the inherited environment untouched.
    pub fn env(mut self, env: Option<EnvironmentMap>) -> Self {
        self.env = env;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.env.as_ref()
    }
}

/// A request for running the bundler against a named base configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    name: String,
    env: EnvironmentMap,
}

impl BuildRequest {
    /// Creates a new [`BuildRequest`] with an empty environment.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            env: EnvironmentMap::new(),
        }
    }

    /// Set the variables injected into the bundler's environment plugin.
    pub fn env(mut self, env: EnvironmentMap) -> Self {
        self.env = env;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &EnvironmentMap {
        &self.env
    }
}
