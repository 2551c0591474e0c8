use std::borrow::Cow;

use regex::Regex;

use crate::constants::{
    ATTR_NAME, ATTR_VALUE, TAG_PROPERTIES, TAG_PROPERTY, TAG_TEST_CASE, TESTCASE_ID_PROPERTY,
};
use crate::document::{Document, Element};
use crate::types::{AnnotateResult, Config, Property};

/// Finds `ID(<project>-<number>)` markers inside test case names.
#[derive(Debug, Clone)]
pub struct TestCaseIdMatcher {
    regex: Regex,
}

impl TestCaseIdMatcher {
    pub fn new(project: &str) -> Result<Self, regex::Error> {
        // Trailing whitespace belongs to the marker so that stripping it leaves a clean name
        let regex = Regex::new(&format!(r"ID\(({}-[0-9]+)\)\s*", regex::escape(project)))?;
        Ok(Self { regex })
    }

    /// Returns `<project>-<number>` from the first marker in `name`.
    pub fn extract<'a>(&self, name: &'a str) -> Option<&'a str> {
        self.regex
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Removes every marker from `name`.
    pub fn strip<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.regex.replace_all(name, "")
    }
}

pub fn annotate(document: &mut Document, config: &Config) -> anyhow::Result<AnnotateResult> {
    add_testsuites_properties(&mut document.root, &config.testsuites_properties);
    let matcher = TestCaseIdMatcher::new(&config.project)?;
    Ok(process_testcases(
        &mut document.root,
        &matcher,
        config.keep_test_case_identifier,
    ))
}

pub fn add_testsuites_properties(root: &mut Element, properties: &[Property]) {
    root.append_child(properties_element(properties));
    log::debug!(
        "Added {} testsuites properties to <{}>",
        properties.len(),
        root.name
    );
}

pub fn process_testcases(
    root: &mut Element,
    matcher: &TestCaseIdMatcher,
    keep_test_case_identifier: bool,
) -> AnnotateResult {
    let mut result = AnnotateResult::default();
    root.for_each_descendant_mut(TAG_TEST_CASE, &mut |testcase: &mut Element| {
        result.test_cases += 1;

        let Some(name) = testcase.attribute(ATTR_NAME) else {
            log::warn!("Skipping test case without a name attribute");
            return;
        };
        let Some(testcase_id) = matcher.extract(name) else {
            return;
        };
        let testcase_id = testcase_id.to_owned();
        let new_name = (!keep_test_case_identifier).then(|| matcher.strip(name).into_owned());

        log::debug!("Found test case id {} in {:?}", testcase_id, name);
        testcase.append_child(properties_element(&[Property::new(
            TESTCASE_ID_PROPERTY,
            testcase_id,
        )]));
        result.annotated += 1;

        if let Some(new_name) = new_name {
            testcase.set_attribute(ATTR_NAME, new_name);
            result.renamed += 1;
        }
    });
    result
}

fn properties_element(properties: &[Property]) -> Element {
    let mut container = Element::new(TAG_PROPERTIES);
    for Property { name, value } in properties {
        container.append_child(
            Element::new(TAG_PROPERTY)
                .with_attribute(ATTR_NAME, name.as_str())
                .with_attribute(ATTR_VALUE, value.as_str()),
        );
    }
    container
}
