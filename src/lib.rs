pub use silo_core::*;

pub mod mysql {
    pub use silo_mysql::*;
}
pub mod postgres {
    pub use silo_postgres::*;
}
pub mod sqlite {
    pub use silo_sqlite::*;
}

use std::sync::Arc;

/// A registry with every bundled dialect registered under its driver name.
pub fn default_registry() -> DialectRegistry {
    let mut registry = DialectRegistry::new();
    registry.register("mysql", Arc::new(mysql::MysqlDialect));
    registry.register("postgres", Arc::new(postgres::PostgresDialect));
    registry.register("sqlite", Arc::new(sqlite::SqliteDialect));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_driver_names() {
        let registry = default_registry();
        for name in ["mysql", "postgres", "sqlite"] {
            let dialect = registry.get(name).expect("registered dialect");
            assert_eq!(dialect.name(), name);
        }
        assert!(registry.get("oracle").is_none());
    }
}
