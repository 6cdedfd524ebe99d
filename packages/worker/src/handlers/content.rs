use common::event::{OutcomeData, TaskErrorInfo};
use common::jobs::{ImagePromptJob, ImproveJob, PostJob, TopicsJob};
use providers::ProviderFactory;
use tracing::info;

use super::{Execution, ai_error, factory_error};

/// Produce a fresh topic list for a theme.
pub async fn generate_topics(
    factory: &ProviderFactory,
    job: TopicsJob,
) -> Result<Execution, TaskErrorInfo> {
    let service = factory.default_service().map_err(factory_error)?;
    info!(
        theme_id = job.theme_id,
        existing = job.existing_topics.len(),
        provider = service.provider_name(),
        "Generating topics"
    );

    let suggested = service
        .generate_topics(&job.theme_title, &job.existing_topics)
        .await
        .map_err(ai_error)?;

    Ok(Execution::ai(
        OutcomeData::Topics {
            topics: suggested.topics,
        },
        service.as_ref(),
    ))
}

/// Produce a full post for a theme topic.
pub async fn generate_post(
    factory: &ProviderFactory,
    job: PostJob,
) -> Result<Execution, TaskErrorInfo> {
    let service = factory.default_service().map_err(factory_error)?;
    info!(
        theme_id = job.theme_id,
        topic = %job.topic,
        post_type = %job.post_type,
        provider = service.provider_name(),
        "Generating post"
    );

    let generated = service
        .generate_post_content(
            &job.topic,
            job.post_type,
            &job.theme_title,
            job.topic_data.as_ref(),
        )
        .await
        .map_err(ai_error)?;

    Ok(Execution::ai(
        OutcomeData::Post {
            post_type: job.post_type,
            topic: job.topic,
            title: generated.title,
            content: generated.content,
            promotional_post: generated.promotional_post,
            cover_image_prompt: generated.cover_image_prompt,
            seo_title: generated.seo_title,
            seo_description: generated.seo_description,
        },
        service.as_ref(),
    ))
}

/// Rewrite an existing post's content.
pub async fn improve_post(
    factory: &ProviderFactory,
    job: ImproveJob,
) -> Result<Execution, TaskErrorInfo> {
    let service = factory.default_service().map_err(factory_error)?;
    info!(
        post_id = job.post_id,
        post_type = %job.post_type,
        provider = service.provider_name(),
        "Improving post"
    );

    let improved = service
        .improve_post_content(&job.content, &job.title, job.post_type, &job.topic)
        .await
        .map_err(ai_error)?;

    Ok(Execution::ai(
        OutcomeData::Improved {
            content: improved.content,
            improvement_summary: improved.improvement_summary,
        },
        service.as_ref(),
    ))
}

/// Produce a fresh cover image prompt for an article.
pub async fn regenerate_image_prompt(
    factory: &ProviderFactory,
    job: ImagePromptJob,
) -> Result<Execution, TaskErrorInfo> {
    let service = factory.default_service().map_err(factory_error)?;
    info!(
        post_id = job.post_id,
        provider = service.provider_name(),
        "Regenerating cover image prompt"
    );

    let prompt = service
        .regenerate_cover_image_prompt(
            &job.title,
            &job.topic,
            &job.theme_title,
            job.current_prompt.as_deref(),
        )
        .await
        .map_err(ai_error)?;

    Ok(Execution::ai(
        OutcomeData::ImagePrompt {
            cover_image_prompt: prompt.cover_image_prompt,
            style_notes: prompt.style_notes,
        },
        service.as_ref(),
    ))
}
