use std::fmt::Display;

use sg_core::StoryError;

fn map_error(code: &'static str, error: impl Display) -> StoryError {
    StoryError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: StoryError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).expect("string json")
    );
    1
}

pub(crate) fn map_cli_node_script(error: std::num::ParseIntError) -> StoryError {
    map_error("CLI_NODE_SCRIPT_ID", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(StoryError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        let invalid = "x1".parse::<u32>().expect_err("not a number");
        assert_eq!(map_cli_node_script(invalid).code, "CLI_NODE_SCRIPT_ID");
    }
}
