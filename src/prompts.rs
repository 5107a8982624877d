pub const VIDEO_ANALYSIS: &str = include_str!("../data/prompts/video_analysis.txt");

/// Resolve the prompt for a run: an explicit prompt wins, then a prompt file,
/// then the built-in video analysis prompt.
pub fn resolve(inline: Option<String>, file: Option<&std::path::Path>) -> crate::Result<String> {
    if let Some(prompt) = inline {
        return Ok(prompt);
    }
    match file {
        Some(path) => {
            let prompt = std::fs::read_to_string(path)?;
            if prompt.trim().is_empty() {
                return Err(crate::Error::Config(format!(
                    "Prompt file {} is empty",
                    path.display()
                )));
            }
            Ok(prompt.trim().to_string())
        }
        None => Ok(VIDEO_ANALYSIS.trim().to_string()),
    }
}
