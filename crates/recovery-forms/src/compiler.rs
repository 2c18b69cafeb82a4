use recovery_core::models::conversation::{ConversationalFormData, ConversationalStep};
use recovery_core::models::form::{FormDefinition, FormSection};

/// Stable step id for a question. Derived from ids rather than positions so a
/// recompiled form keeps every `current_step_id` stored against it valid.
pub fn step_id(section_id: &str, question_id: &str) -> String {
    format!("{section_id}/{question_id}")
}

/// Compile a form into its linear conversational flow.
///
/// Sections are walked in `sort_order` (ties keep stored order), questions in
/// stored order. Empty sections contribute nothing, so every step's
/// `next_step_id` points at the next question actually asked.
pub fn compile(form: &FormDefinition) -> ConversationalFormData {
    let mut sections: Vec<&FormSection> = form.sections.iter().collect();
    sections.sort_by_key(|s| s.sort_order);

    let mut steps: Vec<ConversationalStep> = sections
        .iter()
        .flat_map(|section| {
            section.questions.iter().map(move |question| ConversationalStep {
                id: step_id(&section.id, &question.id),
                position: 0,
                section_id: section.id.clone(),
                section_name: section.name.clone(),
                question_id: question.id.clone(),
                text: question.text.clone(),
                question_type: question.question_type,
                required: question.required,
                options: question.options.clone(),
                validation_rules: question.validation_rules.clone(),
                help_text: question.help_text.clone(),
                medical_definition: question.medical_definition.clone(),
                next_step_id: None,
                conditional_next: Vec::new(),
            })
        })
        .collect();

    let next_ids: Vec<Option<String>> = steps
        .iter()
        .skip(1)
        .map(|s| Some(s.id.clone()))
        .chain(std::iter::once(None))
        .collect();
    for (index, (step, next)) in steps.iter_mut().zip(next_ids).enumerate() {
        step.position = index + 1;
        step.next_step_id = next;
    }

    let total_questions = steps.len();
    let required_questions = steps.iter().filter(|s| s.required).count();

    ConversationalFormData {
        form_id: form.id.clone(),
        form_name: form.name.clone(),
        description: form.description.clone(),
        estimated_minutes: form.estimated_minutes,
        allow_partial_completion: form.allow_partial_completion,
        voice_enabled: form.voice_enabled,
        total_questions,
        required_questions,
        intro_message: intro_message(form, total_questions),
        completion_message: completion_message(form),
        steps,
    }
}

fn intro_message(form: &FormDefinition, total_questions: usize) -> String {
    let mut message = format!("Let's get started with your {}.", form.name);
    if !form.description.is_empty() {
        message.push(' ');
        message.push_str(&form.description);
    }

    if total_questions == 1 {
        message.push_str(" There is 1 question");
    } else {
        message.push_str(&format!(" There are {total_questions} questions"));
    }
    if form.estimated_minutes > 0 {
        message.push_str(&format!(
            ", which should take about {} minute{}",
            form.estimated_minutes,
            if form.estimated_minutes == 1 { "" } else { "s" }
        ));
    }
    message.push('.');

    if form.voice_enabled {
        message.push_str(" You can type your answers or use your voice.");
    }
    if form.allow_partial_completion {
        message.push_str(" You can say \"pause\" at any time to finish later.");
    }
    message
}

fn completion_message(form: &FormDefinition) -> String {
    format!(
        "Thank you for completing your {}. Your care team will review your answers.",
        form.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use recovery_core::models::form::{Question, QuestionType};

    fn question(id: &str, required: bool) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}?"),
            question_type: QuestionType::Text,
            required,
            options: Vec::new(),
            validation_rules: None,
            help_text: None,
            medical_definition: None,
        }
    }

    fn section(id: &str, sort_order: i32, questions: Vec<Question>) -> FormSection {
        FormSection {
            id: id.to_string(),
            name: format!("Section {id}"),
            sort_order,
            questions,
        }
    }

    fn form(sections: Vec<FormSection>) -> FormDefinition {
        FormDefinition {
            id: "post-op".to_string(),
            name: "post-op survey".to_string(),
            description: String::new(),
            sections,
            estimated_minutes: 3,
            allow_partial_completion: false,
            voice_enabled: false,
        }
    }

    fn chain(data: &ConversationalFormData) -> Vec<(String, Option<String>)> {
        data.steps
            .iter()
            .map(|s| (s.id.clone(), s.next_step_id.clone()))
            .collect()
    }

    #[test]
    fn orders_by_sort_order_and_skips_empty_sections() {
        let data = compile(&form(vec![
            section("late", 3, vec![question("q4", false)]),
            section("empty", 2, vec![]),
            section("early", 1, vec![question("q1", true), question("q2", true)]),
        ]));

        assert_eq!(
            chain(&data),
            vec![
                ("early/q1".to_string(), Some("early/q2".to_string())),
                ("early/q2".to_string(), Some("late/q4".to_string())),
                ("late/q4".to_string(), None),
            ]
        );
        let positions: Vec<_> = data.steps.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(data.steps[2].section_name, "Section late");
        assert!(data.steps.iter().all(|s| s.conditional_next.is_empty()));
    }

    #[test]
    fn totals_match_definition() {
        let f = form(vec![
            section("a", 1, vec![question("q1", true), question("q2", false)]),
            section("b", 2, vec![question("q3", true), question("q4", true)]),
        ]);
        let data = compile(&f);
        assert_eq!(data.total_questions, f.question_count());
        assert_eq!(data.total_questions, 4);
        assert_eq!(data.required_questions, 3);
    }

    #[test]
    fn compiling_twice_is_identical() {
        let f = form(vec![
            section("b", 2, vec![question("q3", false)]),
            section("a", 1, vec![question("q1", true), question("q2", true)]),
        ]);
        let first = compile(&f);

        let stored = serde_json::to_string(&f).unwrap();
        let reloaded: FormDefinition = serde_json::from_str(&stored).unwrap();
        let second = compile(&reloaded);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.steps).unwrap(),
            serde_json::to_string(&second.steps).unwrap()
        );
    }

    #[test]
    fn empty_form_compiles_to_no_steps() {
        let data = compile(&form(vec![section("a", 1, vec![])]));
        assert!(data.steps.is_empty());
        assert_eq!(data.total_questions, 0);
        assert!(data.first_step().is_none());
    }

    #[test]
    fn intro_mentions_count_and_duration() {
        let mut f = form(vec![section("a", 1, vec![question("q1", true)])]);
        f.voice_enabled = true;
        let data = compile(&f);
        assert_eq!(
            data.intro_message,
            "Let's get started with your post-op survey. There is 1 question, which should \
             take about 3 minutes. You can type your answers or use your voice."
        );
    }

    #[test]
    fn lookup_helpers_follow_the_chain() {
        let data = compile(&form(vec![section(
            "a",
            1,
            vec![question("q1", true), question("q2", true)],
        )]));
        assert_eq!(data.step_for_question("q2").unwrap().id, "a/q2");
        assert_eq!(data.previous_step_id("a/q2"), Some("a/q1"));
        assert_eq!(data.previous_step_id("a/q1"), None);
        assert!(data.step("a/q3").is_none());
    }
}
