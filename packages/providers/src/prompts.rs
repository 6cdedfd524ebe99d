//! Prompt builders for the four content operations.
//!
//! Each builder returns the full user prompt (and, where applicable, the
//! system message) fed to the provider. The JSON shape requested at the end
//! of every prompt matches the structs in [`crate::types`].

use common::status::PostType;
use common::topic::Topic;

/// System message for post generation.
pub fn post_system(post_type: PostType) -> String {
    format!(
        "You are an expert in technical content creation for LinkedIn. Always respond only \
         with valid JSON. You are creating a {post_type} for developers. All prompts and \
         generated content must be in English."
    )
}

/// System message for post improvement.
pub const IMPROVE_SYSTEM: &str = "You are an expert technical content creator and \
    security-focused code reviewer. You MUST respond with valid JSON only. Never include \
    markdown code blocks or any text outside the JSON object. Always ensure your JSON is \
    properly formatted and escaped.";

/// System message for cover image prompt regeneration.
pub const IMAGE_PROMPT_SYSTEM: &str = "You are an expert visual designer and AI prompt \
    engineer. NEVER include text in image descriptions. Always respond with valid JSON. \
    Create detailed, text-free professional image generation prompts.";

/// User prompt asking for 3-5 topics for a theme. When `existing` is
/// non-empty the prompt lists the stored titles and asks for complementary
/// topics instead of duplicates.
pub fn topics_prompt(theme_title: &str, existing: &[Topic]) -> String {
    let existing_context = if existing.is_empty() {
        String::new()
    } else {
        let titles = existing
            .iter()
            .map(|t| format!("- {}", t.title))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "\n**IMPORTANT - Existing Topics to Avoid Duplication:**\n\
             The following topics have already been suggested for this theme:\n\
             {titles}\n\n\
             Please generate NEW topics that complement these existing ones, avoiding \
             repetition and exploring different angles of the theme.\n"
        )
    };
    let additional = if existing.is_empty() { "" } else { "additional " };

    format!(
        r#"You are an expert in technical content creation for LinkedIn, focused on developers.

**Theme/Stack:** "{theme_title}"
{existing_context}
**Target Audience:**
- Junior developers
- Senior engineers
- General tech professionals

**Task:**
Generate 3 to 5 {additional}specific topics for weekly LinkedIn posts. Each topic should include:
1. **Title/Topic** - Clear and specific title
2. **Suggested Hook** - Catchy question or statement to start the post
3. **Post Type** - Recommended format: "simple" for a short post, "article" for a long-form piece
4. **One-sentence Summary** - One sentence summary of the main idea
5. **Suggested CTA** - Engaging call to action for the end of the post

**Desired Tone:**
- Conversational, accessible, and direct
- Focused on real problems developers face
- Practical and applicable

Return in JSON format:
{{
    "topics": [
        {{
            "title": "Specific topic title",
            "hook": "Catchy question or statement",
            "post_type": "simple or article",
            "summary": "One sentence summary of the topic",
            "cta": "Engaging call to action"
        }}
    ]
}}"#
    )
}

fn simple_template() -> &'static str {
    r#"Create a simple LinkedIn post following this template:

1. Catchy opening hook (1-2 lines)
2. Topic development (2-3 short paragraphs)
3. Call to action or question for engagement
4. Relevant hashtags (3-5 hashtags)

The post must have a maximum of 1300 characters and be engaging.
Tone: conversational, accessible, and direct."#
}

fn article_template() -> &'static str {
    r#"Create a comprehensive LinkedIn article following this template:

**ARTICLE STRUCTURE:**
1. Catchy and professional title
2. Introduction presenting the problem/opportunity (200-250 words)
3. 3-4 well-developed main points with examples (800-1000 words total)
4. Conclusion with practical insights and actionable takeaways (200-250 words)
5. Call to action for engagement

**ALSO CREATE A PROMOTIONAL POST:**
Additionally, create a short promotional LinkedIn post (max 1300 characters) to promote this article.
The promotional post should:
- Hook readers with an intriguing question or statement
- Briefly tease the main value/insights of the article
- Include a clear call-to-action to read the full article
- End with relevant hashtags (6-8)

**COVER IMAGE PROMPT:**
Create a detailed description for an AI image generator to create a professional cover image for this article.

CRITICAL RULE - NO TEXT IN IMAGE:
NEVER include text, titles, letters, or words in the image.
DO NOT show the article title or any written content.
Focus purely on visual elements, symbols, and abstract representations.

The description should be:
- Visual-only elements that represent the technical topic
- Abstract or realistic approach (but never textual)
- Professional modern aesthetic suitable for LinkedIn
- Specific colors, style, and composition details
- Clean, minimalist design without any text
- 120-200 words describing only visual elements

The article should be between 1500-2000 words, informative and professional.
Tone: conversational, accessible, and direct."#
}

/// User prompt asking for a full post. `topic_data` carries the structured
/// topic the title was picked from, when one is stored on the theme.
pub fn post_prompt(
    topic: &str,
    post_type: PostType,
    theme_title: &str,
    topic_data: Option<&Topic>,
) -> String {
    let template = match post_type {
        PostType::Simple => simple_template(),
        PostType::Article => article_template(),
    };

    let topic_context = topic_data
        .map(|data| {
            format!(
                "**Structured topic data:**\n\
                 - Suggested hook: \"{}\"\n\
                 - Suggested post type: {}\n\
                 - Summary: {}\n\
                 - Suggested CTA: \"{}\"\n\n\
                 Use this information as a basis, but adapt as needed for the requested content type.",
                data.hook, data.post_type, data.summary, data.cta
            )
        })
        .unwrap_or_default();

    format!(
        r#"You are an expert in technical content creation for LinkedIn, focused on developers.

**General theme:** "{theme_title}"
**Specific topic:** "{topic}"
**Content type:** {post_type}

{topic_context}

{template}

**Target Audience:**
- Junior developers
- Senior engineers
- General tech professionals

Also create:
- SEO optimized title (max. 60 characters)
- SEO description (max. 160 characters)

**Focus on:**
- Real problems developers face
- Practical and applicable solutions
- Concrete examples when possible

Return in JSON format:
{{
    "title": "Post/article title",
    "content": "Full content (article text for articles, post text for simple posts)",
    "promotional_post": "Short promotional post text (only for articles, omit for simple posts)",
    "cover_image_prompt": "Detailed description for AI image generation (only for articles, omit for simple posts)",
    "seo_title": "SEO title",
    "seo_description": "SEO description"
}}

All prompts and generated content must be in English."#
    )
}

/// User prompt asking for an enhanced rewrite of an existing post.
pub fn improve_prompt(
    current_content: &str,
    post_title: &str,
    post_type: PostType,
    topic: &str,
) -> String {
    let output_kind = match post_type {
        PostType::Article => "article",
        PostType::Simple => "simple post",
    };

    format!(
        r#"You are an expert technical content creator and code reviewer, specialized in creating secure, production-ready content for developers.

**TASK:** Enhance and improve the following {post_type} content with enhanced details, practical examples, and secure code.

**ENHANCEMENT REQUIREMENTS:**
1. **Extend with More Details**: Add deeper explanations for each key point
2. **Practical Examples**: Include real-world scenarios with working code examples
3. **Security-First Code**: All code must be rigorously secure and follow best practices
4. **Error-Free Implementation**: Code should be production-ready, tested, and robust
5. **Technical Depth**: Explain the "why" and "how" behind each concept
6. **Markdown Formatting**: Use proper Markdown syntax for better readability

**CURRENT CONTENT TO IMPROVE:**
Title: "{post_title}"
Topic: "{topic}"
Content: "{current_content}"

**CODE QUALITY STANDARDS:**
- Include proper error handling
- Use secure coding practices (input validation, sanitization, etc.)
- Add comments explaining critical sections
- Follow language-specific best practices
- Include edge case handling
- Use meaningful variable names
- Implement proper logging where applicable

**FORMATTING GUIDELINES:**
- Use # ## ### for headers
- Use ```language for code blocks with proper language specification
- Use **bold** for emphasis
- Use `inline code` for technical terms
- Use > for important notes/warnings
- Use - or * for bullet points
- Add horizontal rules (---) between major sections

**OUTPUT STRUCTURE:**
The {output_kind} should be significantly enhanced with:
- More comprehensive explanations
- Additional practical examples
- Security considerations
- Performance tips
- Common pitfalls to avoid
- Related concepts and connections
- Relevant hashtags (6-8 relevant hashtags)

**CRITICAL:** Return only valid JSON. No markdown code blocks, no additional text, just the JSON object.

Return the improved content in this exact JSON format:
{{
    "improved_content": "Enhanced content in Markdown format with detailed explanations and secure code examples",
    "improvement_summary": "Brief summary of key improvements made"
}}

**TARGET AUDIENCE:**
- Junior to Senior developers
- DevOps engineers
- Technical leads
- Security-conscious developers

All content must be in English and technically accurate."#
    )
}

/// User prompt asking for a fresh text-free cover image description.
pub fn image_prompt_prompt(
    post_title: &str,
    topic: &str,
    theme_title: &str,
    current_prompt: Option<&str>,
) -> String {
    let current = current_prompt
        .map(|p| format!("Current prompt: \"{p}\""))
        .unwrap_or_else(|| "This is the first generation.".to_string());

    format!(
        r#"You are an expert in visual design and AI image generation prompts, specialized in creating professional cover images WITHOUT TEXT.

**TASK:** Create a detailed, professional prompt for AI image generation to create a cover image for a LinkedIn article.

**ARTICLE DETAILS:**
- Title: "{post_title}"
- Topic: "{topic}"
- Theme: "{theme_title}"

**CURRENT PROMPT (if regenerating):**
{current}

**CRITICAL RULE - NO TEXT IN IMAGE:**
NEVER include text, titles, letters, or words in the image.
DO NOT show the article title or any written content.
AVOID any textual elements or typography.
Focus purely on visual elements, symbols, and abstract representations.
Maximum 1-2 single keywords if absolutely essential (but prefer none).

**VISUAL APPROACH:**
1. **Abstract/Conceptual**: Use shapes, symbols, metaphors to represent the topic
2. **Realistic Elements**: Objects, tools, or environments related to the concept
3. **Symbolic Representation**: Icons and symbols that convey the meaning
4. **Color Psychology**: Use colors that evoke the right emotions for the topic
5. **Minimalist Design**: Clean, uncluttered composition

**STYLE GUIDELINES:**
- Professional, modern aesthetic suitable for LinkedIn
- High-quality digital art or professional photography style
- Balanced composition with focal point
- Corporate color palette (blues, grays, whites, accent colors)
- Clean backgrounds (gradients, textures, or solid colors)
- Subtle lighting and shadows for depth
- 16:9 aspect ratio (landscape orientation)

**VISUAL ELEMENTS TO CONSIDER:**
- For Technology: Geometric shapes, circuits, glowing elements, abstract networks
- For Business: Professional objects, charts (visual only), ascending elements
- For Development: Code-inspired patterns, building blocks, construction metaphors
- For Leadership: Mountain peaks, pathways, guiding lights, upward arrows
- For Innovation: Light bulbs, gears, flowing energy, dynamic compositions

**OUTPUT:** Create a detailed description (120-200 words) focusing purely on visual elements.

Return in JSON format:
{{
    "cover_image_prompt": "Detailed visual-only description for AI image generation",
    "style_notes": "Brief explanation of the visual approach chosen",
    "visual_elements": "Key visual elements that represent the concept"
}}

Remember: NO TEXT, NO TITLES, NO WORDS in the image description!"#
    )
}
