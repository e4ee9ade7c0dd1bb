use image::{DynamicImage, RgbImage};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use trex_rust::{
    Error, Trex2Api,
    api::{BatchInfer, BatchPrompts, Task},
    prompt::{
        EmbeddingItem, EmbeddingPrompt, GenericPrompt, ImageInput, InteractiveItem, PointPrompt,
        RectPrompt,
    },
};

mod common;
use common::{
    MockCloudClient, create_batches_result, create_embd_result, create_objects_result,
    create_raw_object,
};

fn create_api(mock: &Arc<MockCloudClient>) -> Trex2Api {
    Trex2Api::new(mock.clone())
}

#[tokio::test]
async fn test_interactive_rect_and_point_items() {
    let mock = Arc::new(MockCloudClient::new().with_result(create_batches_result(vec![
        vec![create_raw_object(0.9, Some(1), [10.0, 10.0, 20.0, 30.0])],
        vec![
            create_raw_object(0.8, Some(2), [5.0, 5.0, 15.0, 15.0]),
            create_raw_object(0.4, Some(2), [7.0, 7.0, 9.0, 9.0]),
        ],
    ])));
    let api = create_api(&mock);

    let items = vec![
        InteractiveItem::rect(
            "https://files.test/interactive1.jpeg",
            vec![RectPrompt {
                category_id: 1,
                rects: vec![[10.0, 10.0, 20.0, 30.0]],
            }],
        ),
        InteractiveItem::point(
            "https://files.test/interactive2.jpg",
            vec![PointPrompt {
                category_id: 2,
                points: vec![[10.0, 10.0]],
            }],
        ),
    ];

    let results = api.interactive_inference(&items).await.unwrap();

    let tasks = mock.get_tasks();
    assert_eq!(tasks.len(), 1);
    match &tasks[0] {
        Task::InteractiveInfer(batches) => {
            assert_eq!(batches.len(), 2);
            assert!(matches!(
                &batches[0],
                BatchInfer::Rect { image, prompts }
                    if image == "https://files.test/interactive1.jpeg"
                        && prompts[0].category_id == Some(1)
            ));
            assert!(matches!(
                &batches[1],
                BatchInfer::Point { prompts, .. } if prompts[0].points == vec![[10.0, 10.0]]
            ));
        }
        other => panic!("expected interactive task, got {:?}", other),
    }

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].labels(), &[1]);
    assert_eq!(results[1].scores(), &[0.8, 0.4]);
    assert!(mock.get_uploads().is_empty());
}

#[tokio::test]
async fn test_generic_inconsistent_prompts_make_no_calls() {
    let mock = Arc::new(MockCloudClient::new());
    let api = create_api(&mock);

    let prompts = vec![
        GenericPrompt::rects("test_images/generic_prompt1.jpg", vec![[692.0, 338.0, 725.0, 459.0]]),
        GenericPrompt::points("test_images/generic_prompt2.jpg", vec![[600.0, 300.0]]),
    ];

    let err = api
        .generic_inference(&ImageInput::parse("test_images/generic_target.jpg"), &prompts)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InconsistentPromptType { .. }));
    assert!(mock.get_uploads().is_empty());
    assert!(mock.get_tasks().is_empty());
}

#[tokio::test]
async fn test_generic_inference_labels_default_to_zero() {
    let mock = Arc::new(MockCloudClient::new().with_result(create_objects_result(vec![
        create_raw_object(0.7, None, [0.0, 0.0, 1.0, 1.0]),
        create_raw_object(0.2, None, [2.0, 2.0, 3.0, 3.0]),
    ])));
    let api = create_api(&mock);

    let prompts = vec![
        GenericPrompt::rects("https://files.test/p1.jpg", vec![[692.0, 338.0, 725.0, 459.0]]),
        GenericPrompt::rects("https://files.test/p2.jpg", vec![[561.0, 231.0, 634.0, 351.0]]),
    ];

    let result = api
        .generic_inference(&ImageInput::parse("https://files.test/target.jpg"), &prompts)
        .await
        .unwrap();

    assert_eq!(result.labels(), &[0, 0]);
    assert_eq!(result.len(), 2);

    let tasks = mock.get_tasks();
    match &tasks[0] {
        Task::GenericInfer { image, prompts } => {
            assert_eq!(image, "https://files.test/target.jpg");
            assert_eq!(prompts.len(), 2);
            match prompts {
                BatchPrompts::Rect(rects) => {
                    assert_eq!(rects[1].image.as_deref(), Some("https://files.test/p2.jpg"));
                    assert_eq!(rects[1].category_id, None);
                }
                other => panic!("expected rect prompts, got {:?}", other),
            }
        }
        other => panic!("expected generic task, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generic_inference_without_prompts() {
    let mock = Arc::new(MockCloudClient::new());
    let api = create_api(&mock);

    let err = api
        .generic_inference(&ImageInput::parse("https://files.test/target.jpg"), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyPrompts));
    assert!(mock.get_tasks().is_empty());
}

#[tokio::test]
async fn test_customize_embedding_returns_url() {
    let mock = Arc::new(
        MockCloudClient::new().with_result(create_embd_result("https://files.test/embd.safetensors")),
    );
    let api = create_api(&mock);

    let prompts = vec![
        GenericPrompt::points("https://files.test/p1.jpg", vec![[700.0, 400.0]]),
        GenericPrompt::points("https://files.test/p2.jpg", vec![[600.0, 300.0]]),
    ];

    let url = api.customize_embedding(&prompts).await.unwrap();

    assert_eq!(url, "https://files.test/embd.safetensors");
    let tasks = mock.get_tasks();
    assert!(matches!(&tasks[0], Task::EmbdCustomize(BatchPrompts::Point(points)) if points.len() == 2));
}

#[tokio::test]
async fn test_customize_embedding_missing_embd() {
    let mock = Arc::new(MockCloudClient::new());
    let api = create_api(&mock);

    let prompts = vec![GenericPrompt::rects(
        "https://files.test/p1.jpg",
        vec![[0.0, 0.0, 1.0, 1.0]],
    )];

    let err = api.customize_embedding(&prompts).await.unwrap_err();
    assert!(matches!(err, Error::RemoteTask(_)));
}

#[tokio::test]
async fn test_customize_embedding_inconsistent_prompts_make_no_calls() {
    let mock = Arc::new(
        MockCloudClient::new().with_result(create_embd_result("https://files.test/embd.safetensors")),
    );
    let api = create_api(&mock);

    let prompts = vec![
        GenericPrompt::points("test_images/generic_prompt1.jpg", vec![[700.0, 400.0]]),
        GenericPrompt::rects("test_images/generic_prompt2.jpg", vec![[561.0, 231.0, 634.0, 351.0]]),
    ];

    let err = api.customize_embedding(&prompts).await.unwrap_err();

    assert!(matches!(err, Error::InconsistentPromptType { .. }));
    assert!(mock.get_uploads().is_empty());
    assert!(mock.get_tasks().is_empty());
}

#[tokio::test]
async fn test_embedding_inference_resolves_embeddings() {
    let dir = common::create_temp_dir();
    let embd_path = common::write_test_file(&dir, "pigeon.safetensors", "weights");

    let mock = Arc::new(MockCloudClient::new().with_result(create_batches_result(vec![vec![
        create_raw_object(0.95, Some(2), [1.0, 2.0, 3.0, 4.0]),
    ]])));
    let api = create_api(&mock);

    let items = vec![EmbeddingItem {
        image: ImageInput::parse("https://files.test/interactive1.jpeg"),
        prompts: vec![
            EmbeddingPrompt {
                category_id: 1,
                embedding: ImageInput::parse("https://files.test/football_player.safetensors"),
            },
            EmbeddingPrompt {
                category_id: 2,
                embedding: ImageInput::Path(embd_path.clone()),
            },
        ],
    }];

    let results = api.embedding_inference(&items).await.unwrap();

    let uploads = mock.get_uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].path, embd_path);

    match &mock.get_tasks()[0] {
        Task::EmbdInfer(batches) => {
            assert_eq!(batches[0].prompts[0].embd, "https://files.test/football_player.safetensors");
            assert_eq!(batches[0].prompts[1].embd, "https://files.test/pigeon.safetensors");
            assert_eq!(batches[0].prompts[1].category_id, 2);
        }
        other => panic!("expected embedding task, got {:?}", other),
    }
    assert_eq!(results[0].labels(), &[2]);
}

#[tokio::test]
async fn test_in_memory_target_is_uploaded_and_removed() {
    let mock = Arc::new(MockCloudClient::new().with_result(create_objects_result(vec![])));
    let api = create_api(&mock);

    let target = ImageInput::Pixels(DynamicImage::ImageRgb8(RgbImage::new(8, 8)));
    let prompts = vec![GenericPrompt::rects(
        "https://files.test/p1.jpg",
        vec![[0.0, 0.0, 4.0, 4.0]],
    )];

    let result = api.generic_inference(&target, &prompts).await.unwrap();
    assert!(result.is_empty());

    let uploads = mock.get_uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].existed);
    assert!(!uploads[0].path.exists());
}

#[tokio::test]
async fn test_remote_failure_propagates_verbatim() {
    let mock = Arc::new(MockCloudClient::new().with_task_error("batch size exceeds 4"));
    let api = create_api(&mock);

    let items: Vec<InteractiveItem> = (0..5)
        .map(|i| {
            InteractiveItem::rect(
                format!("https://files.test/{}.jpg", i).as_str(),
                vec![RectPrompt {
                    category_id: 1,
                    rects: vec![[0.0, 0.0, 1.0, 1.0]],
                }],
            )
        })
        .collect();

    let err = api.interactive_inference(&items).await.unwrap_err();

    assert_eq!(err.to_string(), "Remote task failed: batch size exceeds 4");
    assert_eq!(mock.get_tasks().len(), 1);
}
