// LLM prompt templates for suggestion generation.
// Every template carries a `{user_story}` placeholder, replaced before sending.

/// Instruction block for stories the well-formed classifier rejected.
pub const WELL_FORMED_PROMPT_TEMPLATE: &str = r#"You are an Agile expert with a deep understanding of the AQUSA framework, specifically the Well-Formed criteria for user stories in software development.
Evaluate the following user story and provide five main suggestions for improvement based on these criteria:

User Story: '{user_story}'

Your suggestions should focus on:

1. Enhancing clarity (max 100 words).
2. Increasing completeness (max 100 words).

Please ensure that each section does not exceed the specified word limit and print each suggestion on a new line with the following format:

Enhancing clarity: [Your explanation here, max 100 words; do not exceed this limit]

Increasing completeness: [Your explanation here, max 100 words; do not exceed this limit]

Do not generate improved user stories; focus solely on providing suggestions."#;

/// Instruction block for stories the ambiguity classifier flagged.
pub const AMBIGUITY_PROMPT_TEMPLATE: &str = r#"You are an Agile expert with a deep understanding of the AQUSA framework, specifically the criteria related to eliminating ambiguity in user stories within software development.
Evaluate the following user story and provide five main suggestions for improvement based on the ambiguity criteria:

User Story: '{user_story}'

Your suggestions should focus on:

1. Identifying vague terms or phrases that could lead to misunderstandings (max 100 words).
2. Recommending specific language to replace ambiguous terms to enhance clarity (max 100 words).
3. Ensuring the user story is actionable and specific, allowing for clear development tasks (max 100 words).
4. Clarifying the intent and scope of the user story to align stakeholders' expectations (max 100 words).
5. Providing concrete examples or contexts that illustrate the desired outcome (max 100 words).

Please ensure that each section does not exceed the specified word limit and print each suggestion on a new line with the following format:

Identifying vague terms or phrases: [Your explanation here, max 100 words; do not exceed this limit]

Recommending specific language to replace ambiguous terms: [Your explanation here, max 100 words; do not exceed this limit]

Ensuring the user story is actionable and specific: [Your explanation here, max 100 words; do not exceed this limit]

Clarifying the intent and scope of the user story: [Your explanation here, max 100 words; do not exceed this limit]

Providing concrete examples or contexts: [Your explanation here, max 100 words; do not exceed this limit]

Do not generate improved user stories; focus solely on providing suggestions."#;

/// Free-form improvement prompt used by `/api/improve-user-story`, independent of predictions.
pub const IMPROVE_PROMPT_TEMPLATE: &str = r#"You are an expert in improving user stories for software development. I need your help to make the following user story clearer and more actionable.

Review the user story for any ambiguous or unclear elements. Provide specific ideas on how to transform it into an unambiguous user story.

Here is the user story:

"{user_story}"

Please generate five suggestions that include ideas for improvement along with their justification for how they enhance clarity and functional requirements. Each suggestion should also indicate how it leaves room for further discussion or refinement with stakeholders.

1. **Idea**: [Your idea for improving the user story]
   - **Justification**: [Explain why this improvement enhances clarity and functional requirements]
   - **Discussion Point**: [Highlight areas that may require further input or confirmation from stakeholders]
2. ..."#;
