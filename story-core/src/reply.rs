//! Reply composition.
//!
//! Pure functions that render stage content plus the fixed menu of next
//! commands into user-facing text. Calling these twice with the same input
//! yields the same output; all state lives elsewhere.

use crate::session::Stage;

/// How the stage content being shown was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// First generation for this stage.
    Fresh,

    /// Regenerated after a modify command.
    Modified,

    /// Regenerated after a reject.
    Regenerated,
}

const SEPARATOR: &str = "---------------";

/// Render a stage's content with its menu of next commands.
pub fn stage_reply(stage: Stage, presentation: Presentation, content: &str) -> String {
    let lead = match (stage, presentation) {
        (Stage::Outline, Presentation::Fresh) => "这是根据主题生成的故事大纲:",
        (Stage::Outline, Presentation::Modified) => "这是修改后的故事大纲:",
        (Stage::Outline, Presentation::Regenerated) => "这是重新生成的故事大纲:",
        (Stage::Storyline, Presentation::Fresh) => "这是根据大纲生成的故事线:",
        (Stage::Storyline, Presentation::Modified) => "这是修改后的故事线:",
        (Stage::Storyline, Presentation::Regenerated) => "这是重新生成的故事线:",
        (Stage::Story, Presentation::Fresh) => "这是根据大纲和故事线生成的完整故事:",
        (Stage::Story, Presentation::Modified) => "这是修改后的故事内容:",
        (Stage::Story, Presentation::Regenerated) => "重新生成的故事内容如下:",
    };

    let menu = match stage {
        Stage::Outline => {
            "你是否满意这个大纲？如果满意，我们可以开始创作故事线。不满意就重新创作或者输入（修改 修改的内容）"
        }
        Stage::Storyline => {
            "你是否满意这个故事线？如果满意，我们可以开始创作完整的故事内容。不满意就重新创作或者输入（修改 修改的内容）"
        }
        Stage::Story => "你是否满意这个故事？不满意就重新创作或者输入（修改 修改的内容）",
    };

    format!("{lead}\n{content}\n{SEPARATOR}\n{menu}")
}

/// Render the stage-appropriate clarifying prompt for unrecognized input.
pub fn clarify(stage: Stage) -> String {
    match stage {
        Stage::Outline => "请明确您是否满意故事大纲。",
        Stage::Storyline => "请明确您是否满意故事线。",
        Stage::Story => "请明确您是否满意故事内容。",
    }
    .to_string()
}

/// Compile the finished artifact from all three stages, in order.
pub fn final_story(outline: &str, storyline: &str, story: &str) -> String {
    format!(
        "完整的故事:\n{SEPARATOR}\n故事大纲:\n{outline}\n{SEPARATOR}\n故事线:\n{storyline}\n{SEPARATOR}\n故事内容:\n{story}"
    )
}

/// Render the workflow-completion reply wrapping the final artifact.
pub fn completion_reply(outline: &str, storyline: &str, story: &str) -> String {
    format!(
        "故事创作完成！\n{}，\n{SEPARATOR}\n 故事君告退，撒花、撒花、撒花！！！",
        final_story(outline, storyline, story)
    )
}

/// Render the exit farewell.
pub fn exit_reply() -> String {
    "故事创作已结束。感谢您的参与！您可以随时通过使用触发词重新开始新的故事创作。".to_string()
}

/// Usage blurb for help surfaces.
pub fn help_text() -> String {
    "请发送一个故事主题，我们将帮助您创作一个完整的故事。".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_reply_contains_content_and_menu() {
        let reply = stage_reply(Stage::Outline, Presentation::Fresh, "第一章：相遇");
        assert!(reply.contains("第一章：相遇"));
        assert!(reply.starts_with("这是根据主题生成的故事大纲:"));
        assert!(reply.contains("你是否满意这个大纲"));
    }

    #[test]
    fn test_stage_reply_is_pure() {
        let a = stage_reply(Stage::Story, Presentation::Modified, "结局");
        let b = stage_reply(Stage::Story, Presentation::Modified, "结局");
        assert_eq!(a, b);
    }

    #[test]
    fn test_final_story_field_order() {
        let text = final_story("O", "L", "S");
        let outline_at = text.find("故事大纲:\nO").unwrap();
        let storyline_at = text.find("故事线:\nL").unwrap();
        let story_at = text.find("故事内容:\nS").unwrap();
        assert!(outline_at < storyline_at);
        assert!(storyline_at < story_at);
    }

    #[test]
    fn test_completion_wraps_final_story() {
        let reply = completion_reply("O", "L", "S");
        assert!(reply.starts_with("故事创作完成！"));
        assert!(reply.contains(&final_story("O", "L", "S")));
    }
}
