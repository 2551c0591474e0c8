use crate::config::ConfigError;
use crate::document::DocumentError;
use crate::runner::MissingFileError;

const CONFIG_HELP_TEXT: &str =
    "Hint: the configuration file must be a YAML mapping with at least a `project` key";
const EXTRA_PROPERTIES_HELP_TEXT: &str =
    "Hint: extra testsuites properties look like `name:value,other-name:other-value`";

pub struct ErrorReport {
    pub error: anyhow::Error,
    pub exit_code: i32,
}

impl ErrorReport {
    pub fn new(error: anyhow::Error) -> Self {
        Self {
            exit_code: ErrorReport::find_exit_code(&error),
            error,
        }
    }

    fn find_exit_code(error: &anyhow::Error) -> i32 {
        if let Some(missing) = find_cause::<MissingFileError>(error) {
            log::error!("{}", missing);
            return exitcode::NOINPUT;
        }

        if let Some(config_error) = find_cause::<ConfigError>(error) {
            log::error!("{:#}", error);
            match config_error {
                ConfigError::InvalidExtraProperty { .. } => {
                    log::info!("{}", EXTRA_PROPERTIES_HELP_TEXT)
                }
                ConfigError::MissingProject | ConfigError::Parse(_) => {
                    log::info!("{}", CONFIG_HELP_TEXT)
                }
            }
            return exitcode::CONFIG;
        }

        if let Some(document_error) = find_cause::<DocumentError>(error) {
            log::error!("{:#}", error);
            return match document_error {
                DocumentError::Io(_) => exitcode::IOERR,
                _ => exitcode::DATAERR,
            };
        }

        if find_cause::<std::io::Error>(error).is_some() {
            log::error!("{:#}", error);
            return exitcode::IOERR;
        }

        log::error!("Error: {:?}", error);
        exitcode::SOFTWARE
    }
}

fn find_cause<T: std::error::Error + Send + Sync + 'static>(error: &anyhow::Error) -> Option<&T> {
    error.chain().find_map(|cause| cause.downcast_ref::<T>())
}
