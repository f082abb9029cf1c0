//! Moving folders and the cascade that rewrites descendant paths.

mod helpers;

use arbor_core::error::ErrorKind;
use arbor_database::FailurePolicy;
use arbor_entity::folder::{ParentList, ParentRef};

use helpers::{Chain, TestApp};

#[tokio::test]
async fn test_move_rewrites_whole_subtree() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;

    let moved = app
        .service
        .move_folder(&app.ctx, &chain.f1.id.to_string(), &chain.f4.id.to_string())
        .await
        .expect("move");

    let root = ParentList::root();
    let under_f4 = root.extended(chain.f4.id);
    let under_f1 = under_f4.extended(chain.f1.id);
    let under_f2 = under_f1.extended(chain.f2.id);
    let under_f3 = under_f2.extended(chain.f3.id);

    assert_eq!(moved.parent(), ParentRef::Folder(chain.f4.id));
    assert_eq!(moved.parent_list(), &under_f4);

    let f1 = app.folder(chain.f1.id).await;
    let f2 = app.folder(chain.f2.id).await;
    let f3 = app.folder(chain.f3.id).await;
    assert_eq!(f1.parent(), ParentRef::Folder(chain.f4.id));
    assert_eq!(f1.parent_list().len(), 2);
    assert_eq!(f2.parent_list(), &under_f1);
    assert_eq!(f2.parent_list().len(), 3);
    assert_eq!(f3.parent_list(), &under_f2);
    assert_eq!(f3.parent_list().len(), 4);

    // Immediate parents are unchanged below the moved folder.
    assert_eq!(f2.parent(), ParentRef::Folder(chain.f1.id));
    assert_eq!(f3.parent(), ParentRef::Folder(chain.f2.id));

    assert_eq!(app.file(chain.file1.id).await.parent_list(), &under_f1);
    assert_eq!(app.file(chain.file2.id).await.parent_list(), &under_f2);
    assert_eq!(app.file(chain.file3.id).await.parent_list(), &under_f3);

    // The unrelated destination is untouched.
    assert_eq!(app.folder(chain.f4.id).await, chain.f4);
}

#[tokio::test]
async fn test_move_keeps_file_content() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;

    app.service
        .move_folder(&app.ctx, &chain.f1.id.to_string(), &chain.f4.id.to_string())
        .await
        .expect("move");

    let file = app.file(chain.file3.id).await;
    assert_eq!(file.content, chain.file3.content);
    assert_eq!(file.length, chain.file3.length);
    assert_eq!(file.parent(), ParentRef::Folder(chain.f3.id));
}

#[tokio::test]
async fn test_move_to_root() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;

    let moved = app
        .service
        .move_folder(&app.ctx, &chain.f2.id.to_string(), "/")
        .await
        .expect("move to root");

    assert!(moved.is_top_level());
    assert_eq!(moved.parent_list(), &ParentList::root());

    let under_f2 = ParentList::root().extended(chain.f2.id);
    assert_eq!(app.folder(chain.f3.id).await.parent_list(), &under_f2);
    assert_eq!(app.file(chain.file2.id).await.parent_list(), &under_f2);
    assert_eq!(
        app.file(chain.file3.id).await.parent_list(),
        &under_f2.extended(chain.f3.id)
    );

    // The former parent keeps its own file and loses nothing else.
    assert_eq!(app.folder(chain.f1.id).await, chain.f1);
    assert_eq!(app.file(chain.file1.id).await, chain.file1);
}

#[tokio::test]
async fn test_move_to_current_parent_changes_nothing() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;
    let before = chain.snapshot(&app).await;

    let moved = app
        .service
        .move_folder(&app.ctx, &chain.f2.id.to_string(), &chain.f1.id.to_string())
        .await
        .expect("no-op move");

    assert_eq!(moved, chain.f2);
    assert_eq!(chain.snapshot(&app).await, before);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_move_into_self_or_descendant_is_rejected() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;
    let before = chain.snapshot(&app).await;
    let f1 = chain.f1.id.to_string();

    for target in [chain.f1.id, chain.f2.id, chain.f3.id] {
        let err = app
            .service
            .move_folder(&app.ctx, &f1, &target.to_string())
            .await
            .expect_err("cycle");
        assert_eq!(err.kind, ErrorKind::InvalidOperation);
    }

    assert_eq!(chain.snapshot(&app).await, before);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_move_back_restores_paths() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;
    let f1 = chain.f1.id.to_string();

    app.service
        .move_folder(&app.ctx, &f1, &chain.f4.id.to_string())
        .await
        .expect("move away");
    app.service
        .move_folder(&app.ctx, &f1, "/")
        .await
        .expect("move back");

    let (folders, files) = chain.snapshot(&app).await;
    let expected = [&chain.f1, &chain.f2, &chain.f3, &chain.f4];
    for (found, original) in folders.iter().zip(expected) {
        assert_eq!(found.parent(), original.parent());
        assert_eq!(found.parent_list(), original.parent_list());
    }
    let expected = [&chain.file1, &chain.file2, &chain.file3];
    for (found, original) in files.iter().zip(expected) {
        assert_eq!(found.parent_list(), original.parent_list());
    }
}

#[tokio::test]
async fn test_interrupted_move_reports_partial_failure_and_retry_converges() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;
    let f1 = chain.f1.id.to_string();
    let f4 = chain.f4.id.to_string();

    // The moved folder and F2 are written, then F3 fails.
    app.fail_with(FailurePolicy::AfterWrites(2));
    let err = app
        .service
        .move_folder(&app.ctx, &f1, &f4)
        .await
        .expect_err("interrupted");
    assert_eq!(err.kind, ErrorKind::PartialFailure);
    assert!(err.is_retryable());

    let under_f4 = ParentList::root().extended(chain.f4.id);
    assert_eq!(app.folder(chain.f1.id).await.parent_list(), &under_f4);
    assert_eq!(
        app.folder(chain.f2.id).await.parent_list(),
        &under_f4.extended(chain.f1.id)
    );
    assert_eq!(app.folder(chain.f3.id).await, chain.f3);

    app.fail_with(FailurePolicy::Never);
    app.service
        .move_folder(&app.ctx, &f1, &f4)
        .await
        .expect("retry");

    // F3 and the three files.
    assert_eq!(app.store.write_count(), 4);

    let under_f1 = under_f4.extended(chain.f1.id);
    let under_f2 = under_f1.extended(chain.f2.id);
    assert_eq!(app.folder(chain.f3.id).await.parent_list(), &under_f2);
    assert_eq!(app.file(chain.file1.id).await.parent_list(), &under_f1);
    assert_eq!(app.file(chain.file2.id).await.parent_list(), &under_f2);
    assert_eq!(
        app.file(chain.file3.id).await.parent_list(),
        &under_f2.extended(chain.f3.id)
    );
}

#[tokio::test]
async fn test_failure_on_moved_folder_writes_nothing() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;
    let before = chain.snapshot(&app).await;

    app.fail_with(FailurePolicy::OnFolder(chain.f1.id));
    let err = app
        .service
        .move_folder(&app.ctx, &chain.f1.id.to_string(), &chain.f4.id.to_string())
        .await
        .expect_err("store fault");

    assert_eq!(err.kind, ErrorKind::Database);
    assert_eq!(chain.snapshot(&app).await, before);
}

#[tokio::test]
async fn test_file_fault_mid_cascade_is_partial() {
    let app = TestApp::new();
    let chain = Chain::build(&app).await;

    app.fail_with(FailurePolicy::OnFile(chain.file2.id));
    let err = app
        .service
        .move_folder(&app.ctx, &chain.f2.id.to_string(), "/")
        .await
        .expect_err("file fault");
    assert_eq!(err.kind, ErrorKind::PartialFailure);

    app.fail_with(FailurePolicy::Never);
    app.service
        .move_folder(&app.ctx, &chain.f2.id.to_string(), "/")
        .await
        .expect("retry");
    assert_eq!(
        app.file(chain.file2.id).await.parent_list(),
        &ParentList::root().extended(chain.f2.id)
    );
}
