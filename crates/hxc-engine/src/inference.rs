//! Variable type inference.
//!
//! Given a declaration or an iteration binding, scan the surrounding text to
//! determine the bound type. The scanners here work on raw characters through
//! the buffer interface, tolerate incomplete code, and never fail: an
//! undeterminable type degrades to the dynamic key, and the result is marked
//! `INFERRED` so a later pass may recompute it.

use regex::Regex;
use rustc_hash::FxHashSet;
use tracing::debug;

use hxc_model::store::split_top_level;
use hxc_model::{
    ClassModel, EvalFlags, ExprContext, ExprResult, FileModel, FlagType, MemberModel,
};

use crate::CompletionEngine;

impl CompletionEngine<'_> {
    /// Infer the type of `var_model` from its declaration site and write it
    /// back (`type_name` + `INFERRED` flag). Dispatches on the declaration
    /// line: a `for (name in ...` header routes to the iteration inferencer,
    /// anything else to the declaration inferencer.
    pub fn infer_variable_type(&self, local: &mut ExprContext, var_model: &mut MemberModel) {
        let line = self.buffer.line_text(var_model.line_from);
        let for_in = Regex::new(&format!(
            r"\s*for\s*\(\s*{}\s*in\s*",
            regex::escape(&var_model.name)
        ));
        if let Ok(for_in) = for_in {
            if let Some(m) = for_in.find(&line) {
                let rvalue_start = self.buffer.position_from_line(var_model.line_from) + m.end();
                self.infer_iteration_type(rvalue_start, local, var_model);
                return;
            }
        }
        let declaration = Regex::new(&format!(
            r"(?:var|final)\s+\??{}\b[^=]*=\s*",
            regex::escape(&var_model.name)
        ));
        if let Ok(declaration) = declaration {
            if let Some(m) = declaration.find(&line) {
                let rvalue_start = self.buffer.position_from_line(var_model.line_from) + m.end();
                self.infer_declaration_type(rvalue_start, local, var_model);
            }
        }
    }

    /// Iteration form: `for (it in <iterable>)`.
    ///
    /// Scans from just after the `in` keyword to the end of the enclosing
    /// function, then resolves the iterable's element type: an integer range
    /// binds `Int`; otherwise the iterable's `iterator()`, `hasNext`/`next`,
    /// or degenerate `Iterator<...>` shape decides, walking extends and
    /// typedef-alias chains.
    fn infer_iteration_type(
        &self,
        rvalue_start: usize,
        local: &mut ExprContext,
        var_model: &mut MemberModel,
    ) {
        let features = self.ctx.features().clone();
        let method_end = match self.ctx.current_member() {
            Some(member) => self.buffer.line_end_position(member.line_to),
            None => self.buffer.length(),
        };
        let mut par_count = 0i32;
        let mut bra_count = 0i32;
        let mut i = rvalue_start;
        while i < method_end {
            if self.buffer.is_in_comment(i) || self.buffer.is_in_string(i) {
                i += 1;
                continue;
            }
            let c = self.buffer.char_at(i);
            if c <= ' ' {
                i += 1;
                continue;
            }
            if c == '{' {
                bra_count += 1;
            } else if c == '}' {
                bra_count -= 1;
            }
            // for (i in 0...10)
            else if c == '.'
                && self.buffer.char_at(i + 1) == '.'
                && self.buffer.char_at(i + 2) == '.'
            {
                let ty = self.ctx.resolve_type(&features.integer_key, None);
                var_model.type_name = Some(ty.qualified_name());
                var_model.flags |= FlagType::INFERRED;
                return;
            }
            if c == '(' {
                par_count += 1;
            }
            // for (it in expr)
            else if c == ')' || (c == ';' && bra_count == 0) {
                par_count -= 1;
                if par_count >= 0 {
                    i += 1;
                    continue;
                }
                self.resolve_iterable_element(rvalue_start, i, local, var_model, &features);
                return;
            }
            i += 1;
        }
    }

    /// The boundary of the iterable expression has been found at `end`;
    /// resolve the iterable's type and derive the element type from it.
    fn resolve_iterable_element(
        &self,
        rvalue_start: usize,
        end: usize,
        local: &mut ExprContext,
        var_model: &mut MemberModel,
        features: &hxc_model::LanguageFeatures,
    ) {
        let current_file = self.ctx.current_file().clone();
        let current_class = self.ctx.current_class().clone();
        let word_left = self.buffer.word_left_of(end.saturating_sub(1), false);
        let expr: ExprResult;
        if word_left == var_model.name {
            // self-referential iteration:
            //   var a = [1,2,3,4];
            //   for (a in a) { trace(a|); }
            // bind to the nearest preceding declaration of the same name
            let line_before = self.buffer.line_from_position(end) - 1;
            let mut vars = local.local_vars.clone();
            vars.sort_by(|l, r| r.line_from.cmp(&l.line_from));
            if let Some(model) = vars.iter().find(|it| it.line_from <= line_before) {
                expr = ExprResult {
                    ty: Some(self.ctx.resolve_type(model.type_str(), Some(&current_file))),
                    in_class: Some(current_class.clone()),
                    ..Default::default()
                };
            } else {
                // class members
                match current_class.search_member(&local.value, FlagType::empty()) {
                    Some(member) => {
                        expr = ExprResult {
                            ty: Some(
                                self.ctx.resolve_type(member.type_str(), Some(&current_file)),
                            ),
                            member: Some(member.clone()),
                            in_class: Some(current_class.clone()),
                            ..Default::default()
                        };
                    }
                    None => return,
                }
            }
        } else {
            expr = self.expression_type_before(rvalue_start, end, local);
        }
        let Some(mut expr_type) = expr.ty.clone() else {
            return;
        };
        let mut iterator_index_type: Option<String> = None;
        let mut visited: FxHashSet<String> = FxHashSet::default();
        while !expr_type.is_void() {
            if !visited.insert(expr_type.name.clone()) {
                debug!(name = %expr_type.name, "cycle in iterable chain");
                break;
            }
            // typedef Ints = Array<Int>
            if expr_type.flags.contains(FlagType::TYPEDEF) && expr_type.members.is_empty() {
                expr_type = self.infer_typedef_type(&expr_type);
                continue;
            }
            if let Some(member) = expr_type.search_member("iterator", FlagType::empty()) {
                let ty = self.ctx.resolve_type(member.type_str(), Some(&current_file));
                iterator_index_type = ty.index_type.clone();
                break;
            }
            if expr_type.has_member("hasNext") {
                if let Some(next) = expr_type.search_member("next", FlagType::empty()) {
                    iterator_index_type = next.type_name.clone();
                }
            }
            let own_index = expr_type.index_type.clone().unwrap_or_default();
            if expr_type.name.starts_with("Iterator<")
                && !own_index.is_empty()
                && self.ctx.resolve_type(&own_index, Some(&current_file)).is_void()
            {
                // untyped iterator: fall back to the enclosing class
                expr_type = expr.in_class.clone().unwrap_or_else(ClassModel::void);
                break;
            }
            if iterator_index_type.is_some() {
                break;
            }
            expr_type = self.ctx.resolve_extends(&expr_type);
        }
        if let Some(index_type) = &iterator_index_type {
            var_model.type_name = Some(index_type.clone());
            let expr_index = expr_type.index_type.clone().unwrap_or_default();
            if expr_index.contains(',') {
                // multi-parameter generic: if the element is not literally one
                // of the bound arguments, re-derive it by aligning index-type
                // positions with a supertype
                let origin_types: Vec<String> = split_top_level(&expr_index, ',')
                    .into_iter()
                    .map(|s| s.to_string())
                    .collect();
                if !origin_types
                    .iter()
                    .any(|t| Some(t.as_str()) == var_model.type_name.as_deref())
                {
                    var_model.type_name = None;
                    let mut t = self.ctx.resolve_extends(&expr_type);
                    let mut seen: FxHashSet<String> = FxHashSet::default();
                    while !t.is_void() && seen.insert(t.name.clone()) {
                        let index = t.index_type.clone().unwrap_or_default();
                        for (j, candidate) in split_top_level(&index, ',').iter().enumerate() {
                            if candidate.trim() != index_type.as_str() {
                                continue;
                            }
                            if let Some(origin) = origin_types.get(j) {
                                var_model.type_name = Some(origin.trim().to_string());
                            }
                            break;
                        }
                        if var_model.type_name.is_some() {
                            break;
                        }
                        t = self.ctx.resolve_extends(&t);
                    }
                }
            }
        }
        if var_model.type_name.is_none() {
            let ty = self.ctx.resolve_type(&features.dynamic_key, None);
            var_model.type_name = Some(ty.qualified_name());
        }
        debug!(name = %var_model.name, ty = ?var_model.type_name, "iteration variable inferred");
        var_model.flags |= FlagType::INFERRED;
    }

    /// Declaration form: `var x = <rvalue>`, local or member.
    fn infer_declaration_type(
        &self,
        rvalue_start: usize,
        local: &mut ExprContext,
        var_model: &mut MemberModel,
    ) {
        // completing inside the rvalue itself: nothing to learn yet
        if local.position_expression <= rvalue_start && rvalue_start <= local.position {
            return;
        }
        let word = self.buffer.word_right_of(rvalue_start, true);
        // for example: var v = v;
        if !word.is_empty() && word == local.value {
            return;
        }
        let features = self.ctx.features().clone();
        // for example: untyped __js__('value').<complete>
        if word == features.untyped_key {
            let ty = self.ctx.resolve_type(&features.dynamic_key, None);
            var_model.type_name = Some(ty.qualified_name());
            var_model.flags |= FlagType::INFERRED;
            return;
        }
        if var_model.flags.contains(FlagType::LOCAL_VAR) {
            self.infer_local_variable_type(rvalue_start, local, var_model);
            return;
        }
        if var_model.flags.contains(FlagType::VARIABLE) {
            let limit = self.buffer.line_end_position(var_model.line_to);
            let rvalue_end = self.expression_end_position(rvalue_start, limit);
            let expr = self.expression_type_before(rvalue_start, rvalue_end, local);
            let mut ty = expr.ty.clone().unwrap_or_else(ClassModel::void);
            if ty.is_void() {
                if let Some(member) = &expr.member {
                    ty = self
                        .ctx
                        .resolve_type(member.type_str(), Some(self.ctx.current_file()));
                } else {
                    let token = self.buffer.substring(rvalue_start, rvalue_end);
                    ty = self
                        .ctx
                        .resolve_token(token.trim(), Some(self.ctx.current_file()));
                }
            }
            if ty.is_void() {
                ty = self.ctx.resolve_type(&features.dynamic_key, None);
            }
            var_model.type_name = Some(ty.qualified_name());
            var_model.flags |= FlagType::INFERRED;
        }
    }

    /// Balanced scan for local declarations: extend the rvalue boundary over
    /// chained member access (`a.b.c`) and nested `[]`/`()`/`<>` groups, then
    /// evaluate the expression ending at that boundary.
    ///
    /// Lexical classification is honored only when all three depth counters
    /// are simultaneously zero; inside a group the scan is purely structural.
    fn infer_local_variable_type(
        &self,
        rvalue_start: usize,
        local: &mut ExprContext,
        var_model: &mut MemberModel,
    ) {
        let features = self.ctx.features().clone();
        let mut rvalue_end = self
            .expression_end_position(rvalue_start, self.buffer.line_end_position(var_model.line_to));
        let method_end = match self.ctx.current_member() {
            Some(member) => self.buffer.line_end_position(member.line_to),
            None => self.buffer.length(),
        };
        let mut arr_count = 0i32;
        let mut par_count = 0i32;
        let mut gen_count = 0i32;
        let mut had_dot = false;
        let mut is_in_expr = false;
        let mut i = rvalue_end;
        while i < method_end {
            if arr_count == 0 && par_count == 0 && gen_count == 0 {
                if self.buffer.is_in_comment(i) {
                    i += 1;
                    continue;
                }
                if self.buffer.is_in_string(i) {
                    if is_in_expr {
                        break;
                    }
                    i += 1;
                    continue;
                }
            }
            let c = self.buffer.char_at(i);
            if c == '[' && gen_count == 0 && par_count == 0 {
                arr_count += 1;
                is_in_expr = true;
            } else if c == ']' && gen_count == 0 && par_count == 0 {
                arr_count -= 1;
                rvalue_end = i + 1;
                if arr_count < 0 {
                    break;
                }
            } else if c == '(' && gen_count == 0 && arr_count == 0 {
                par_count += 1;
                is_in_expr = true;
            } else if c == ')' && gen_count == 0 && arr_count == 0 {
                par_count -= 1;
                rvalue_end = i + 1;
                if par_count < 0 {
                    break;
                }
            } else if c == '<' && par_count == 0 && arr_count == 0 {
                gen_count += 1;
                is_in_expr = true;
            } else if c == '>' && par_count == 0 && arr_count == 0 {
                gen_count -= 1;
                rvalue_end = i + 1;
                if gen_count < 0 {
                    break;
                }
            }
            if par_count > 0 || gen_count > 0 || arr_count > 0 {
                i += 1;
                continue;
            }
            if c <= ' ' {
                had_dot = false;
                is_in_expr = true;
                i += 1;
                continue;
            }
            if c == ';' || (!had_dot && features.is_identifier_char(c)) {
                break;
            }
            if c == '.' {
                had_dot = true;
                rvalue_end = self.expression_end_position(i + 1, method_end);
            }
            is_in_expr = true;
            i += 1;
        }
        let expr = self.expression_type_before(rvalue_start, rvalue_end, local);
        if let Some(ty) = &expr.ty {
            if !ty.is_void() {
                var_model.type_name = Some(ty.qualified_name());
                var_model.flags |= FlagType::INFERRED;
                return;
            }
        }
        if let Some(member) = &expr.member {
            var_model.type_name = member.type_name.clone();
            var_model.flags |= FlagType::INFERRED;
            return;
        }
        // generic declaration fallback
        let token = self.buffer.substring(rvalue_start, rvalue_end);
        let mut ty = self
            .ctx
            .resolve_token(token.trim(), Some(self.ctx.current_file()));
        if ty.is_void() {
            ty = self.ctx.resolve_type(&features.dynamic_key, None);
        }
        var_model.type_name = Some(ty.qualified_name());
        var_model.flags |= FlagType::INFERRED;
    }

    /// End position of the primary expression starting at `start`: an
    /// identifier run plus any trailing balanced `(...)`/`[...]` groups,
    /// with string literals consumed whole and `new`/`cast` keywords allowed
    /// to precede the expression.
    pub fn expression_end_position(&self, start: usize, limit: usize) -> usize {
        let features = self.ctx.features().clone();
        let mut pos = start;
        while pos < limit && self.buffer.char_at(pos) <= ' ' && self.buffer.char_at(pos) != '\0' {
            pos += 1;
        }
        let mut end = pos;
        let mut word_start = pos;
        let mut in_word = false;
        let mut par_count = 0i32;
        let mut arr_count = 0i32;
        while pos < limit {
            if par_count == 0 && arr_count == 0 {
                if self.buffer.is_in_comment(pos) {
                    break;
                }
                if self.buffer.is_in_string(pos) {
                    if end > word_start || in_word {
                        break;
                    }
                    while pos < limit && self.buffer.is_in_string(pos) {
                        pos += 1;
                    }
                    end = pos;
                    continue;
                }
            }
            let c = self.buffer.char_at(pos);
            if c == '(' {
                par_count += 1;
                in_word = false;
            } else if c == ')' {
                par_count -= 1;
                if par_count < 0 {
                    break;
                }
                if par_count == 0 && arr_count == 0 {
                    end = pos + 1;
                }
            } else if c == '[' {
                arr_count += 1;
                in_word = false;
            } else if c == ']' {
                arr_count -= 1;
                if arr_count < 0 {
                    break;
                }
                if par_count == 0 && arr_count == 0 {
                    end = pos + 1;
                }
            } else if par_count == 0 && arr_count == 0 {
                if features.is_identifier_char(c) {
                    if !in_word {
                        word_start = pos;
                        in_word = true;
                    }
                    end = pos + 1;
                } else if c <= ' ' {
                    // scan across allocation/cast keywords: `new Foo()`
                    let word = self.buffer.substring(word_start, end);
                    if in_word && (word == "new" || word == "cast") {
                        in_word = false;
                        pos += 1;
                        continue;
                    }
                    break;
                } else {
                    break;
                }
            }
            pos += 1;
        }
        end
    }

    /// Evaluate the expression text in `start..end` (non-completion mode).
    fn expression_type_before(
        &self,
        start: usize,
        end: usize,
        local: &ExprContext,
    ) -> ExprResult {
        let token = self.buffer.substring(start, end);
        let mut sub_context = ExprContext {
            local_vars: local.local_vars.clone(),
            context_function: local.context_function.clone(),
            ..Default::default()
        };
        self.eval_expression(
            token.trim(),
            &mut sub_context,
            Some(self.ctx.current_file()),
            self.ctx.current_class(),
            EvalFlags::empty(),
        )
    }

    /// Project the enclosing function's parameters into `model` as visible
    /// locals. An optional parameter `?x:T` is cloned, renamed to `x`, and
    /// its type widened to `Null<T>` (`Null<Dynamic>` when untyped); the
    /// shared parameter entry is never touched.
    pub fn parse_local_vars(&self, expression: &ExprContext, model: &mut FileModel) {
        let Some(func) = &expression.context_function else {
            return;
        };
        let dynamic_key = &self.ctx.features().dynamic_key;
        for item in &func.parameters {
            let mut item = item.clone();
            if item.name.starts_with('?') {
                let mut ty = item.type_name.clone().unwrap_or_default();
                if ty.is_empty() {
                    ty = format!("Null<{dynamic_key}>");
                } else if !ty.starts_with("Null<") {
                    ty = format!("Null<{ty}>");
                }
                item.name.remove(0);
                item.type_name = Some(ty);
            }
            model.merge_by_line(item);
        }
    }
}

#[cfg(test)]
#[path = "../tests/inference_tests.rs"]
mod inference_tests;
