//! Expression evaluation entry point.
//!
//! The raw candidate expression arriving from the host's tokenizer is not yet
//! resolvable: string and regex literals appear as quote characters or the
//! `#RegExp` marker, nested bracket groups are placeholder-numbered
//! sub-expressions (`#0~`, `#1~`, ...), and macro anti-quotation hides the
//! `$` sigil left of the expression anchor. `eval_expression` rewrites those
//! forms into a plain dot path and delegates to the context's generic
//! resolver.

use tracing::debug;

use hxc_model::{ClassModel, EvalFlags, ExprContext, ExprResult, FileModel};

use crate::CompletionEngine;

impl CompletionEngine<'_> {
    /// Normalize and resolve a candidate expression.
    ///
    /// All rewrites are textual substring operations that preserve everything
    /// outside the matched pattern. A rewrite that cannot be grounded (an
    /// unresolvable bracket literal, for instance) leaves the expression
    /// unchanged and lets the delegate report "no result".
    pub fn eval_expression(
        &self,
        expression: &str,
        context: &mut ExprContext,
        in_file: Option<&FileModel>,
        in_class: &ClassModel,
        flags: EvalFlags,
    ) -> ExprResult {
        let mut expression = expression.to_string();
        if !expression.is_empty() {
            let features = self.ctx.features().clone();
            // transform #2~.#1~.#0~ to #2~.[].[]
            if let Some(subs) = context.sub_expressions.clone() {
                let count = subs.len().wrapping_sub(1);
                for (i, sub) in subs.iter().enumerate() {
                    if sub.len() < 2 || !sub.starts_with('[') {
                        continue;
                    }
                    // for example: [].<complete>, [1 => 2].<complete>
                    if expression.starts_with('#') && i == count {
                        let marker = format!("#{i}~");
                        // a `#`-headed expression that is not a placeholder
                        // reference (mid-edit text) gets no short-circuit
                        if let Some(rest) = expression.strip_prefix(&marker).map(str::to_string) {
                            let ty = self.ctx.resolve_token(sub, in_file);
                            if ty.is_void() {
                                break;
                            }
                            expression = format!("{}.#{rest}", ty.name);
                            let mut remaining = subs.clone();
                            remaining.remove(i);
                            context.sub_expressions = if remaining.is_empty() {
                                None
                            } else {
                                Some(remaining)
                            };
                            debug!(%expression, "bracket literal short-circuit");
                            return self.eval_expression(
                                &expression,
                                context,
                                in_file,
                                in_class,
                                flags,
                            );
                        }
                    }
                    expression = expression.replace(&format!(".#{i}~"), &format!(".{sub}"));
                }
            }
            let c = expression.chars().next().unwrap_or('\0');
            if c == '\'' || c == '"' {
                let ty = self.ctx.resolve_type(&features.string_key, in_file);
                match &context.sub_expressions {
                    // for example: ""|, ''|
                    None => expression = format!("{}.#.", ty.name),
                    // for example: "".<complete>, ''.<complete>
                    Some(subs) => {
                        let pattern = format!("{}.#{}~", c, subs.len().saturating_sub(1));
                        if let Some(at) = expression.find(&pattern) {
                            let after = at + pattern.len();
                            expression = format!("{}.#{}", ty.name, &expression[after..]);
                            if subs.len() == 1 {
                                context.sub_expressions = None;
                            }
                        }
                    }
                }
            } else if expression.starts_with("#RegExp") {
                // for example: ~/pattern/.<complete>
                expression = expression.replacen("#RegExp", &features.regex_key, 1);
            } else if let Some(subs) = &context.sub_expressions {
                if !subs.is_empty() {
                    let last = subs.len() - 1;
                    let pattern = format!("#{last}~");
                    // for example: cast(v, T).<complete>, (v is T).<complete>,
                    // (v:T).<complete>, ...
                    if expression.starts_with(&pattern) {
                        let mut sub = subs[last].clone();
                        if context.word_before == "cast" {
                            sub = format!("cast{sub}");
                        }
                        let ty = self.ctx.resolve_token(&sub, in_file);
                        if !ty.is_void() {
                            expression =
                                format!("{}.#{}", ty.name, &expression[pattern.len()..]);
                        }
                    }
                }
            }
            // macro anti-quotation: $v.<complete> inside a macro body reaches
            // here with an empty preceding word and the sigil just left of
            // the anchor
            if context.word_before.is_empty()
                && context.position_expression > 0
                && self.buffer.char_at(context.position_expression - 1) == '$'
            {
                context.position_expression -= 1;
                context.value = format!("${}", context.value);
            }
        }
        self.ctx
            .resolve_expression(&expression, context, in_file, in_class, flags)
    }
}

#[cfg(test)]
#[path = "../tests/evaluator_tests.rs"]
mod evaluator_tests;
