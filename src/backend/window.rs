//! Active window detection from compositor / X server tool output.
//!
//! The parsing is kept separate from the tool invocations so it can be tested
//! against captured output.

use serde_json::Value;

/// Finds the focused window's class in a `swaymsg -t get_tree` tree.
///
/// Depth-first, pre-order, visiting `nodes` before `floating_nodes`. The
/// class comes from `window_properties.class` (`XWayland`) or `app_id`
/// (native Wayland). Uses an explicit stack; compositor trees can be deep.
#[must_use]
pub fn find_focused_class(tree: &Value) -> Option<String> {
    let mut stack = vec![tree];

    while let Some(node) = stack.pop() {
        if node.get("focused").and_then(Value::as_bool) == Some(true) {
            let class = node
                .get("window_properties")
                .and_then(|p| p.get("class"))
                .and_then(Value::as_str)
                .or_else(|| node.get("app_id").and_then(Value::as_str))
                .filter(|c| !c.is_empty());
            if let Some(class) = class {
                return Some(class.to_string());
            }
        }

        let children = ["nodes", "floating_nodes"]
            .into_iter()
            .filter_map(|key| node.get(key).and_then(Value::as_array))
            .flatten()
            .collect::<Vec<_>>();
        stack.extend(children.into_iter().rev());
    }

    None
}

/// Extracts `class` from `hyprctl activewindow -j` output.
#[must_use]
pub fn hyprland_class(window: &Value) -> Option<String> {
    window
        .get("class")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Extracts the window id from `xprop -root _NET_ACTIVE_WINDOW` output,
/// e.g. `_NET_ACTIVE_WINDOW(WINDOW): window id # 0x3a00007`.
#[must_use]
pub fn parse_active_window_id(output: &str) -> Option<String> {
    if !output.contains("window id #") {
        return None;
    }
    output
        .rsplit('#')
        .next()
        .and_then(|rest| rest.split_whitespace().next())
        .map(|id| id.trim_end_matches(',').to_string())
        .filter(|id| id != "0x0")
}

/// Extracts the class (last quoted value) from `xprop -id <id> WM_CLASS`
/// output, e.g. `WM_CLASS(STRING) = "Navigator", "firefox"`.
#[must_use]
pub fn parse_wm_class(output: &str) -> Option<String> {
    let (_, values) = output.split_once("WM_CLASS(STRING) =")?;
    values
        .split(',')
        .next_back()
        .map(|v| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}
