//! Font-stack discovery and replacement across `text-font` layer properties.
//!
//! `text-font` is either a plain array of font names, a legacy zoom function whose stops
//! carry such arrays, or an expression tree wrapping them in `["literal", [...]]`. During
//! expression traversal, bare string arrays are operator calls (`["zoom"]`,
//! `["geometry-type"]`) and must not be mistaken for font stacks; only the two wrapped
//! forms count there.

use serde_json::Value;

/// Collects every font stack referenced by the `text-font` property of any layer,
/// deduplicated in first-seen order.
pub fn collect_font_stacks(layers: &[Value]) -> Vec<Vec<String>> {
	let mut stacks: Vec<Vec<String>> = Vec::new();
	for layer in layers {
		if let Some(text_font) = layer.pointer("/layout/text-font") {
			for stack in stacks_in(text_font) {
				if !stacks.contains(&stack) {
					stacks.push(stack);
				}
			}
		}
	}
	stacks
}

/// Replaces every font stack in every layer's `text-font` with
/// `[first_match(stack, available)]`, falling back to `[available[0]]`.
///
/// Layers without `text-font` and styles with an empty `available` list are left
/// untouched.
pub fn replace_font_stacks(layers: &mut [Value], available: &[String]) {
	if available.is_empty() {
		return;
	}
	for layer in layers {
		if let Some(text_font) = layer.pointer_mut("/layout/text-font") {
			replace_in(text_font, available);
		}
	}
}

/// Returns the first font of `stack` present in `available`, or `available[0]`.
pub fn first_match(stack: &[String], available: &[String]) -> String {
	stack
		.iter()
		.find(|font| available.contains(font))
		.unwrap_or(&available[0])
		.clone()
}

fn stacks_in(text_font: &Value) -> Vec<Vec<String>> {
	if let Some(stack) = as_string_array(text_font) {
		return vec![stack];
	}
	let mut stacks = Vec::new();
	scan_tree(text_font, &mut stacks);
	stacks
}

fn scan_tree(value: &Value, out: &mut Vec<Vec<String>>) {
	match value {
		Value::Array(items) => {
			if let Some(stack) = as_wrapped_stack(items) {
				out.push(stack);
				return;
			}
			for item in items {
				scan_tree(item, out);
			}
		}
		Value::Object(map) => {
			for item in map.values() {
				if let Some(stack) = as_string_array(item) {
					out.push(stack);
				} else {
					scan_tree(item, out);
				}
			}
		}
		_ => {}
	}
}

fn replace_in(value: &mut Value, available: &[String]) {
	if let Some(stack) = as_string_array(value) {
		*value = Value::from(vec![first_match(&stack, available)]);
		return;
	}
	replace_tree(value, available);
}

fn replace_tree(value: &mut Value, available: &[String]) {
	match value {
		Value::Array(items) => {
			if let Some(stack) = as_wrapped_stack(items) {
				items[1] = Value::from(vec![first_match(&stack, available)]);
				return;
			}
			for item in items {
				replace_tree(item, available);
			}
		}
		Value::Object(map) => {
			for item in map.values_mut() {
				if let Some(stack) = as_string_array(item) {
					*item = Value::from(vec![first_match(&stack, available)]);
				} else {
					replace_tree(item, available);
				}
			}
		}
		_ => {}
	}
}

// A `["literal", [...]]` expression or a `[zoom, [...]]` function stop.
fn as_wrapped_stack(items: &[Value]) -> Option<Vec<String>> {
	if items.len() != 2 || items[0].is_array() || items[0].is_object() {
		return None;
	}
	as_string_array(&items[1])
}

fn as_string_array(value: &Value) -> Option<Vec<String>> {
	let items = value.as_array()?;
	if items.is_empty() {
		return None;
	}
	items
		.iter()
		.map(|item| item.as_str().map(str::to_string))
		.collect::<Option<Vec<String>>>()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn layer(text_font: Value) -> Value {
		json!({"id": "labels", "type": "symbol", "layout": {"text-font": text_font}})
	}

	#[test]
	fn literal_arrays() {
		let layers = vec![layer(json!(["Open Sans Regular", "Arial Unicode MS Regular"]))];
		assert_eq!(
			collect_font_stacks(&layers),
			vec![vec![
				"Open Sans Regular".to_string(),
				"Arial Unicode MS Regular".to_string()
			]]
		);
	}

	#[test]
	fn literal_expressions() {
		let layers = vec![layer(json!([
			"step",
			["zoom"],
			["literal", ["Noto Sans Regular"]],
			10,
			["literal", ["Noto Sans Bold"]]
		]))];
		let stacks = collect_font_stacks(&layers);
		assert_eq!(
			stacks,
			vec![vec!["Noto Sans Regular".to_string()], vec!["Noto Sans Bold".to_string()]]
		);
	}

	#[test]
	fn operator_calls_are_not_stacks() {
		let layers = vec![layer(json!(["case", ["has", "name"], ["literal", ["A"]], ["literal", ["B"]]]))];
		let stacks = collect_font_stacks(&layers);
		assert_eq!(stacks, vec![vec!["A".to_string()], vec!["B".to_string()]]);
	}

	#[test]
	fn legacy_function_stops() {
		let layers = vec![layer(json!({"stops": [[0, ["FontA"]], [10, ["FontB"]]]}))];
		let stacks = collect_font_stacks(&layers);
		assert_eq!(stacks, vec![vec!["FontA".to_string()], vec!["FontB".to_string()]]);
	}

	#[test]
	fn duplicates_collapse() {
		let layers = vec![
			layer(json!(["Open Sans Regular"])),
			layer(json!(["Open Sans Regular"])),
		];
		assert_eq!(collect_font_stacks(&layers).len(), 1);
	}

	#[test]
	fn replacement_picks_first_match() {
		let available = vec!["Noto Sans Regular".to_string(), "Noto Sans Bold".to_string()];
		let mut layers = vec![layer(json!(["Missing Font", "Noto Sans Bold"]))];
		replace_font_stacks(&mut layers, &available);
		assert_eq!(
			layers[0].pointer("/layout/text-font").unwrap(),
			&json!(["Noto Sans Bold"])
		);
	}

	#[test]
	fn replacement_falls_back_to_first_available() {
		let available = vec!["Noto Sans Regular".to_string()];
		let mut layers = vec![layer(json!(["Missing Font"]))];
		replace_font_stacks(&mut layers, &available);
		assert_eq!(
			layers[0].pointer("/layout/text-font").unwrap(),
			&json!(["Noto Sans Regular"])
		);
	}

	#[test]
	fn replacement_inside_expressions() {
		let available = vec!["Noto Sans Regular".to_string()];
		let mut layers = vec![layer(json!(["step", ["zoom"], ["literal", ["X"]], 10, ["literal", ["Y"]]]))];
		replace_font_stacks(&mut layers, &available);
		let text_font = layers[0].pointer("/layout/text-font").unwrap();
		assert_eq!(text_font[2], json!(["literal", ["Noto Sans Regular"]]));
		assert_eq!(text_font[4], json!(["literal", ["Noto Sans Regular"]]));
		// the ["zoom"] operator call is untouched
		assert_eq!(text_font[1], json!(["zoom"]));
	}
}
