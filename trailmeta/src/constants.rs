/// Name of the universal root class every registry owns.
pub const ROOT_CLASS_NAME: &str = "Object";

/// Accessor name prefixes recognised when no configuration overrides them.
pub const DEFAULT_ACCESSOR_PREFIXES: [&str; 2] = ["get", "is"];

/// Annotations that mark an accessor as (part of) the identity of its class.
pub const DEFAULT_ID_ANNOTATIONS: [&str; 2] = ["Id", "EmbeddedId"];

/// Environment variable that overrides the configuration file location.
pub const ENV_META_CONFIG_PATH: &str = "TRAIL_META_CONFIG";
