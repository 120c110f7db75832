use crate::{DatabaseConfig, Result, ScriptContext, Statement};

/// Runs a raw SQL script outside the typed DSL; setup and teardown SQL goes
/// through here.
pub struct ScriptRunner<'a> {
    context: &'a ScriptContext,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(context: &'a ScriptContext) -> Self {
        Self { context }
    }

    pub fn statement(&self, config: &DatabaseConfig) -> Statement {
        config.dialect.build_script(self.context)
    }

    pub fn dry_run(&self) -> Result<String> {
        Ok(self.context.sql.clone())
    }
}
