use conductor_capability::CapabilityDescriptor;
use conductor_task::Operation;

fn words(text: &str) -> Vec<String> {
  text
    .split(|c: char| !c.is_alphanumeric())
    .filter(|w| !w.is_empty())
    .map(str::to_lowercase)
    .collect()
}

/// Whether `needle` appears in `haystack` as consecutive whole words.
fn contains_words(haystack: &[String], needle: &[String]) -> bool {
  !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle)
}

/// Pick the tool that should handle `operation`.
///
/// A tool whose name or description mentions the operation wins over one that
/// only mentions the phase. Matching is on whole words, so `decoder` does not
/// mention the `coder` phase. Ties go to the first descriptor listed.
pub(crate) fn find_tool(
  descriptors: &[CapabilityDescriptor],
  operation: Operation,
) -> Option<&CapabilityDescriptor> {
  let label = words(operation.as_str());
  let phase = words(operation.phase().as_str());

  let haystacks: Vec<Vec<String>> = descriptors
    .iter()
    .map(|d| words(&format!("{} {}", d.name, d.description)))
    .collect();

  haystacks
    .iter()
    .position(|h| contains_words(h, &label))
    .or_else(|| haystacks.iter().position(|h| contains_words(h, &phase)))
    .map(|i| &descriptors[i])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tool(name: &str, description: &str) -> CapabilityDescriptor {
    CapabilityDescriptor::new("local", name, description)
  }

  #[test]
  fn matches_operation_in_name() {
    let tools = vec![tool("lint", "style checks"), tool("review-security", "")];
    let found = find_tool(&tools, Operation::ReviewSecurity).unwrap();
    assert_eq!(found.name, "review-security");
  }

  #[test]
  fn matches_operation_in_description() {
    let tools = vec![tool("pytest", "Run tests and report coverage")];
    assert!(find_tool(&tools, Operation::RunTests).is_some());
    assert!(find_tool(&tools, Operation::GenerateTests).is_none());
  }

  #[test]
  fn operation_match_beats_phase_match() {
    let tools = vec![
      tool("tester_suite", "general tester"),
      tool("generate_tests", "writes tests"),
    ];
    let found = find_tool(&tools, Operation::GenerateTests).unwrap();
    assert_eq!(found.name, "generate_tests");

    let found = find_tool(&tools, Operation::RunTests).unwrap();
    assert_eq!(found.name, "tester_suite");
  }

  #[test]
  fn phase_name_inside_another_word_does_not_match() {
    let tools = vec![tool("base64", "Base64 encoder and decoder")];
    assert!(find_tool(&tools, Operation::Implement).is_none());

    let tools = vec![tool("protester", "Rally tool"), tool("coder", "")];
    assert!(find_tool(&tools, Operation::RunTests).is_none());
    assert_eq!(find_tool(&tools, Operation::Implement).unwrap().name, "coder");
  }

  #[test]
  fn unrelated_tools_do_not_match() {
    let tools = vec![tool("search_docs", "Search documentation")];
    assert!(find_tool(&tools, Operation::Implement).is_none());
  }
}
