//! Prompt templates for the completion service.
//!
//! Plain string building; every function is pure.

use crate::domain::types::RewriteConstraints;

/// Role definition sent as the system message of every call
pub const SYSTEM_PROMPT: &str = "\
You are an expert professional email writer and communication specialist with deep expertise in:
- Corporate communication best practices
- Tone and style adaptation for different audiences
- Clear, concise, and effective writing
- Professional email etiquette and formatting

Your role is to rewrite emails to make them more effective, professional, and tailored to the target audience while maintaining the original intent and key information.";

const REWRITE_GUIDELINES: &str = "\
### Guidelines:
1. Maintain the core message and intent of the original email
2. Improve clarity, conciseness, and readability
3. Ensure appropriate greeting and closing
4. Use proper email structure with clear paragraphs
5. Adapt language and terminology for the target audience
6. Remove redundancy and filler words
7. Ensure professional formatting and grammar

### Output Format:
Provide only the rewritten email content without any explanations, comments, or metadata. The output should be ready to send as-is.";

const JOB_APPLICATION_GUIDELINES: &str = "\
### Rewriting Guidelines:
1. **Opening**: Create a compelling opening that grabs attention
2. **Relevance**: Directly address how your skills match the job requirements
3. **Achievements**: Highlight specific, quantifiable achievements
4. **Value Proposition**: Clearly articulate what you bring to the role
5. **Call to Action**: End with a clear next step
6. **Professional Tone**: Maintain confident but respectful language
7. **Conciseness**: Keep it focused and concise (ideally 200-300 words)

### Structure:
- Professional greeting
- Strong opening statement
- 2-3 paragraphs highlighting relevant experience and skills
- Closing with call to action
- Professional sign-off

### Output:
Provide the complete, polished job application email ready to send.";

const FOLLOW_UP_PRACTICES: &str = "\
### Follow-Up Best Practices:
1. **Reference Previous Communication**: Clearly reference the original conversation/email
2. **State Purpose**: Be clear about why you're following up
3. **Add Value**: Provide additional information or clarification if relevant
4. **Be Concise**: Respect the recipient's time
5. **Clear Ask**: Make any requests or next steps explicit
6. **Professional Persistence**: Be persistent but not pushy
7. **Timing Acknowledgment**: Acknowledge appropriate timing

### Output:
Provide the complete, polished follow-up email.";

const SUMMARY_REQUIREMENTS: &str = "\
### Summarization Requirements:
1. Extract key points and main message
2. Identify action items if any
3. Note important dates or deadlines
4. Highlight any requests or questions
5. Keep summary concise (2-3 sentences for short emails, 1 paragraph for long ones)

### Output Format:
**Summary:** [Main message]
**Action Items:** [List if applicable, or \"None\"]
**Key Dates:** [List if applicable, or \"None\"]";

/// Inputs of the general rewrite prompt
#[derive(Debug, Clone, Default)]
pub struct RewritePromptParams<'a> {
    pub email_text: &'a str,
    pub target_audience: &'a str,
    pub tone: &'a str,
    pub focus_areas: &'a [String],
    pub constraints: Option<&'a RewriteConstraints>,
    pub additional_instructions: Option<&'a str>,
}

/// Inputs of the job application prompt
#[derive(Debug, Clone, Default)]
pub struct JobApplicationPromptParams<'a> {
    pub email_text: &'a str,
    pub job_description: &'a str,
    pub company_name: Option<&'a str>,
    pub key_qualifications: &'a [String],
}

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Canned phrase for a tone; unknown tones get a neutral phrase.
pub fn tone_description(tone: &str) -> &'static str {
    match tone {
        "professional" => "formal, respectful, and business-appropriate",
        "casual" => "friendly, approachable, and conversational",
        "academic" => "scholarly, precise, and well-structured",
        _ => "balanced and appropriate for the context",
    }
}

/// First letter uppercase, the rest lowercase.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn push_code_block(out: &mut String, heading: &str, body: &str) {
    out.push_str(heading);
    out.push_str("\n```\n");
    out.push_str(body);
    out.push_str("\n```\n\n");
}

fn push_bullets<'a>(out: &mut String, heading: &str, prefix: &str, items: impl Iterator<Item = &'a String>) {
    out.push_str(heading);
    out.push('\n');
    for item in items {
        out.push_str("- ");
        out.push_str(prefix);
        out.push_str(item);
        out.push('\n');
    }
    out.push('\n');
}

pub fn rewrite_prompt(params: &RewritePromptParams<'_>) -> String {
    let mut out = String::from("## Task: Rewrite Professional Email\n\n");

    push_code_block(&mut out, "### Original Email:", params.email_text);

    out.push_str("### Target Audience/Context:\n");
    out.push_str(params.target_audience);
    out.push_str("\n\n");

    // Compare on the normalized tone so "CASUAL" still gets the casual phrase
    let tone_key = params.tone.trim().to_lowercase();
    out.push_str("### Tone Requirement:\n");
    out.push_str(&format!(
        "{} tone - {}\n\n",
        capitalize(params.tone.trim()),
        tone_description(&tone_key)
    ));

    let focus_areas: Vec<&String> = params
        .focus_areas
        .iter()
        .filter(|a| !a.trim().is_empty())
        .collect();
    if !focus_areas.is_empty() {
        push_bullets(&mut out, "### Key Focus Areas:", "Emphasize ", focus_areas.into_iter());
    }

    if let Some(constraints) = params.constraints.filter(|c| !c.is_empty()) {
        out.push_str("### Constraints:\n");
        if let Some(max) = constraints.max_length {
            out.push_str(&format!("- Maximum length: {max} words\n"));
        }
        if !constraints.must_include.is_empty() {
            out.push_str(&format!("- Must include: {}\n", constraints.must_include.join(", ")));
        }
        if !constraints.avoid.is_empty() {
            out.push_str(&format!("- Avoid: {}\n", constraints.avoid.join(", ")));
        }
        out.push('\n');
    }

    if let Some(instructions) = params.additional_instructions.filter(|s| !s.trim().is_empty()) {
        out.push_str("### Additional Instructions:\n");
        out.push_str(instructions);
        out.push_str("\n\n");
    }

    out.push_str(REWRITE_GUIDELINES);
    out
}

pub fn job_application_prompt(params: &JobApplicationPromptParams<'_>) -> String {
    let mut out = String::from("## Task: Craft Professional Job Application Email\n\n");

    push_code_block(&mut out, "### Original Content:", params.email_text);
    push_code_block(&mut out, "### Job Description/Requirements:", params.job_description);

    if let Some(company) = params.company_name.filter(|c| !c.trim().is_empty()) {
        out.push_str(&format!("### Company: {company}\n\n"));
    }

    if !params.key_qualifications.is_empty() {
        push_bullets(
            &mut out,
            "### Key Qualifications to Highlight:",
            "",
            params.key_qualifications.iter(),
        );
    }

    out.push_str(JOB_APPLICATION_GUIDELINES);
    out
}

pub fn follow_up_prompt(email_text: &str, context: &str, tone: &str) -> String {
    let mut out = String::from("## Task: Craft Effective Follow-Up Email\n\n");

    push_code_block(&mut out, "### Original Draft:", email_text);

    out.push_str("### Context/Previous Communication:\n");
    out.push_str(context);
    out.push_str("\n\n");

    out.push_str(&format!("### Tone: {}\n\n", capitalize(tone.trim())));

    out.push_str(FOLLOW_UP_PRACTICES);
    out
}

pub fn summary_prompt(email_text: &str) -> String {
    let mut out = String::from("## Task: Summarize Email Content\n\n");
    push_code_block(&mut out, "### Email to Summarize:", email_text);
    out.push_str(SUMMARY_REQUIREMENTS);
    out
}
