// SQL shared by the pool-backed store and the roster transaction

pub(crate) const SELECT_QUEUE_BY_ID: &str = "SELECT * FROM queues WHERE id = ?";

pub(crate) const SELECT_QUEUE_BY_SHORT_ID: &str = "SELECT * FROM queues WHERE short_id = ?";

pub(crate) const SELECT_ROSTER: &str =
    "SELECT * FROM queue_entries WHERE queue_id = ? ORDER BY position ASC, join_time ASC";

pub(crate) const SELECT_ENTRY_FOR_USER: &str =
    "SELECT * FROM queue_entries WHERE queue_id = ? AND user_id = ?";

pub(crate) const SELECT_PROFILE: &str = "SELECT * FROM user_profiles WHERE user_id = ?";

pub(crate) const SELECT_PROFILE_BY_SHORT_ID: &str =
    "SELECT * FROM user_profiles WHERE short_id = ?";

pub(crate) const INSERT_QUEUE: &str = r#"
    INSERT INTO queues (
        id, owner_id, short_id, name, description, category,
        location, image_url, opening_time, closing_time,
        max_capacity, current_queue, est_time_to_serve,
        total_estimated_time, total_served, notify_position,
        status, created_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;
