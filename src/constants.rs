pub const EXIT_SUCCESS: i32 = exitcode::OK;

pub const LOG_FILTER_ENV: &str = "JUNIT_ANNOTATOR_LOG";
pub const REPORT_PATH_ENV: &str = "JUNIT_ANNOTATOR_REPORT_PATH";
pub const CONFIG_FILE_ENV: &str = "JUNIT_ANNOTATOR_CONFIG_FILE";
pub const EXTRA_PROPERTIES_ENV: &str = "JUNIT_ANNOTATOR_EXTRA_PROPERTIES";

/// Prefix of the file written next to the input report.
pub const OUTPUT_FILE_PREFIX: &str = "processed-";

pub const TESTCASE_ID_PROPERTY: &str = "polarion-testcase-id";

pub const TAG_TEST_CASE: &str = "testcase";
pub const TAG_PROPERTIES: &str = "properties";
pub const TAG_PROPERTY: &str = "property";

pub const ATTR_NAME: &str = "name";
pub const ATTR_VALUE: &str = "value";

pub const XML_INDENT_CHAR: u8 = b' ';
pub const XML_INDENT_SIZE: usize = 2;
