use uniteer_core::db::open_db_in_memory;
use uniteer_core::{
    BoardError, BoardService, BoardServiceError, BoardTemplate, DragResult, DropLocation,
    IgnoreReason, MoveOutcome, ProjectTask, SqliteBoardRepository, StageId, StatusStamp,
    TaskStatus,
};

const KEY: &str = "project:launch";

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

fn updated_at(conn: &rusqlite::Connection) -> i64 {
    conn.query_row(
        "SELECT updated_at FROM boards WHERE board_key = ?1;",
        [KEY],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn open_or_create_is_idempotent() {
    let conn = setup();
    let service: BoardService<_, ProjectTask> =
        BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());

    let created = service
        .open_or_create(KEY, BoardTemplate::ProjectTracker)
        .unwrap();
    service
        .create_item(KEY, &StageId::new("todo"), ProjectTask::new("Draft plan"))
        .unwrap();
    let reopened = service
        .open_or_create(KEY, BoardTemplate::Empty)
        .unwrap();

    assert_eq!(created.stage_count(), 3);
    assert_eq!(reopened.stage_count(), 3);
    assert_eq!(reopened.item_count(), 1);
    assert!(matches!(
        service.create_board(KEY, BoardTemplate::Empty),
        Err(BoardServiceError::BoardAlreadyExists(_))
    ));
}

#[test]
fn every_operation_is_persisted() {
    let conn = setup();
    let service: BoardService<_, ProjectTask> =
        BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    service
        .open_or_create(KEY, BoardTemplate::ProjectTracker)
        .unwrap();

    let review = service.create_stage(KEY, "Review").unwrap();
    service.rename_stage(KEY, &review, "QA Review").unwrap();
    let task = service
        .create_item(KEY, &StageId::new("todo"), ProjectTask::new("Ship"))
        .unwrap();
    service
        .update_item(KEY, task, |payload| {
            payload.assignee = Some("dana".to_string())
        })
        .unwrap();

    let board = service.load(KEY).unwrap();
    assert_eq!(board.stage(&review).unwrap().title(), "QA Review");
    assert_eq!(
        board.find_item(task).unwrap().payload.assignee.as_deref(),
        Some("dana")
    );

    let drag = DragResult::item(
        task,
        DropLocation::new("todo", 0),
        Some(DropLocation::new("done", 0)),
    );
    assert!(service.apply_drag(KEY, &drag, &StatusStamp).unwrap().is_applied());
    assert_eq!(
        service.load(KEY).unwrap().find_item(task).unwrap().payload.status,
        TaskStatus::Done
    );

    assert_eq!(service.delete_stage(KEY, &StageId::new("done")).unwrap(), 1);
    assert_eq!(service.load(KEY).unwrap().item_count(), 0);
}

#[test]
fn task_created_in_stage_takes_stage_status() {
    let conn = setup();
    let service: BoardService<_, ProjectTask> =
        BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    service
        .open_or_create(KEY, BoardTemplate::ProjectTracker)
        .unwrap();

    let done = service
        .create_item_with(KEY, &StageId::new("done"), ProjectTask::new("Retro"), &StatusStamp)
        .unwrap();
    let doing = service
        .create_item_with(
            KEY,
            &StageId::new("in-progress"),
            ProjectTask::new("Build"),
            &StatusStamp,
        )
        .unwrap();

    let board = service.load(KEY).unwrap();
    assert_eq!(board.find_item(done).unwrap().payload.status, TaskStatus::Done);
    assert_eq!(
        board.find_item(doing).unwrap().payload.status,
        TaskStatus::InProgress
    );
    assert!(matches!(
        service.create_item_with(
            KEY,
            &StageId::new("ghost"),
            ProjectTask::new("Lost"),
            &StatusStamp
        ),
        Err(BoardServiceError::Board(BoardError::StageNotFound(_)))
    ));
}

#[test]
fn rejected_and_ignored_operations_do_not_write() {
    let conn = setup();
    let service: BoardService<_, ProjectTask> =
        BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());
    service
        .open_or_create(KEY, BoardTemplate::ProjectTracker)
        .unwrap();
    conn.execute(
        "UPDATE boards SET updated_at = 0 WHERE board_key = ?1;",
        [KEY],
    )
    .unwrap();

    assert!(matches!(
        service.create_stage(KEY, "In   Progress"),
        Err(BoardServiceError::Board(BoardError::DuplicateStage(_)))
    ));
    let done = StageId::new("done");
    assert_eq!(
        service
            .apply_drag(KEY, &DragResult::stage(&done, 2, None), &StatusStamp)
            .unwrap(),
        MoveOutcome::Ignored(IgnoreReason::Cancelled)
    );
    assert_eq!(
        service.reorder_stages(KEY, 0, 9).unwrap(),
        MoveOutcome::Ignored(IgnoreReason::IndexOutOfRange)
    );

    assert_eq!(updated_at(&conn), 0);
}

#[test]
fn unknown_board_is_reported() {
    let conn = setup();
    let service: BoardService<_, ProjectTask> =
        BoardService::new(SqliteBoardRepository::try_new(&conn).unwrap());

    match service.create_stage("missing", "Todo") {
        Err(BoardServiceError::BoardNotFound(key)) => assert_eq!(key, "missing"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!service.exists("missing").unwrap());
}
