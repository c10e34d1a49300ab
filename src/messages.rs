use teloxide::types::{KeyboardButton, KeyboardMarkup};
use teloxide::utils::html;

use crate::quiz::exam::{ExamResult, FailureReason, MAX_ERROR_POINTS};
use crate::quiz::session::{Mode, Session};
use crate::quiz::{Media, MediaKind, MediaSource, Question, QuizError};

pub const GREETING_TEXT: &str = "Merhaba! Ehliyet sınavına hazırlanmanıza yardımcı olacağım. \
Bir konuyu baştan sona çalışabilir ya da gerçek sınav formatında bir simülasyon çözebilirsiniz.";

pub const STUDY_MODE: &str = "📚 Tüm Konular";
pub const EXAM_MODE: &str = "📝 Sınav Simülasyonu";
pub const ALL_CHAPTERS: &str = "▶️ Tüm Bölümler";
pub const BACK: &str = "⬅️ Geri";
pub const PREVIOUS: &str = "⬅️ Önceki";
pub const NEXT: &str = "Sonraki ➡️";
pub const FINISH: &str = "🏁 Bitir";
pub const RESTART_STUDY: &str = "🔁 Tekrar Çalış";
pub const RESTART_EXAM: &str = "🔁 Yeni Sınav Başlat";
pub const MAIN_MENU: &str = "🏠 Ana Menü";

pub const EXAM_TITLE: &str = "B Sınıfı Ehliyet Sınavı Simülasyonu";

pub fn mode_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(STUDY_MODE),
        KeyboardButton::new(EXAM_MODE),
    ]])
}

/// One button per row, followed by a row with `extra`.
pub fn list_keyboard<I>(labels: I, extra: &[&str]) -> KeyboardMarkup
where
    I: IntoIterator<Item = String>,
{
    let mut rows = labels
        .into_iter()
        .map(|label| vec![KeyboardButton::new(label)])
        .collect::<Vec<_>>();
    rows.push(extra.iter().map(|e| KeyboardButton::new(*e)).collect());
    KeyboardMarkup::new(rows)
}

pub fn question_keyboard(session: &Session) -> KeyboardMarkup {
    let mut rows = Vec::new();
    if let Some(question) = session.current() {
        if !question.is_free_text() && session.current_answer().is_none() {
            rows.push(
                question
                    .options
                    .iter()
                    .map(|o| KeyboardButton::new(o.letter.clone()))
                    .collect::<Vec<_>>(),
            );
        }
    }

    let mut navigation = Vec::new();
    if session.index() > 0 {
        navigation.push(KeyboardButton::new(PREVIOUS));
    }
    if !session.is_last() {
        navigation.push(KeyboardButton::new(NEXT));
    }
    navigation.push(KeyboardButton::new(FINISH));
    rows.push(navigation);

    KeyboardMarkup::new(rows)
}

pub fn summary_keyboard(session: &Session) -> KeyboardMarkup {
    let restart = if session.is_exam() {
        RESTART_EXAM
    } else {
        RESTART_STUDY
    };
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(restart),
        KeyboardButton::new(MAIN_MENU),
    ]])
}

pub fn session_intro(session: &Session) -> String {
    match session.mode() {
        Mode::Exam => format!(
            "<b>{}</b>\n{} soru. En fazla {} hata puanı yapabilirsiniz; \
             iki adet 5 puanlık hata sınavı kaybettirir.",
            EXAM_TITLE,
            session.len(),
            MAX_ERROR_POINTS
        ),
        Mode::Study { title } => format!(
            "<b>{}</b>\n{} soru. Başarılar!",
            html::escape(title),
            session.len()
        ),
    }
}

/// The current question with its options and, when already answered, the
/// recorded answer. Media goes out in separate messages.
pub fn render_question(session: &Session) -> Result<String, QuizError> {
    let question = match session.current() {
        Some(question) => question,
        None => return Ok("Bu oturumda soru yok.".to_string()),
    };

    let mut text = format!(
        "<b>Soru {} / {}</b> · Puan: {}\n\n<b>{} ({} puan)</b>\n{}\n",
        session.index() + 1,
        session.len(),
        session.score()?,
        html::escape(&question.question_number),
        question.points,
        html::escape(&question.question_text),
    );

    for option in &question.options {
        text.push_str(&format!(
            "\n<b>{})</b> {}",
            html::escape(&option.letter),
            html::escape(&option.text)
        ));
    }

    match session.current_answer() {
        Some(answer) => {
            let verdict = if answer.is_correct { "✅" } else { "❌" };
            text.push_str(&format!(
                "\n\nCevabınız: {} {}",
                html::escape(&answer.submission.to_string()),
                verdict
            ));
        }
        None if question.is_free_text() => text.push_str("\n\nCevabınızı yazın."),
        None => text.push_str(
            "\n\nCevabınızı harf olarak gönderin. Birden fazla seçenek için: <i>a c</i>",
        ),
    }
    Ok(text)
}

/// Link sent in place of a photo or video that could not be uploaded.
pub fn media_link(media: &Media<'_>) -> String {
    let (icon, label) = match media.kind {
        MediaKind::Image => ("🖼", "Görsel"),
        MediaKind::Video => ("🎬", "Video"),
    };
    match media.source {
        MediaSource::Url(url) => {
            format!("{} <a href=\"{}\">{}</a>", icon, html::escape(url), label)
        }
        MediaSource::Local(path) => {
            format!("{} {} yüklenemedi: {}", icon, label, html::escape(path))
        }
    }
}

pub fn correct_answer_text(question: &Question) -> String {
    if question.is_free_text() {
        return question
            .correct_answers
            .first()
            .map(|a| a.letter.clone())
            .unwrap_or_default();
    }
    question
        .correct_answers
        .iter()
        .map(|a| match question.option(&a.letter) {
            Some(option) => format!("{}) {}", option.letter, option.text),
            None => a.letter.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Feedback sent right after an answer is checked.
pub fn feedback(session: &Session, question: &Question, is_correct: bool) -> Result<String, QuizError> {
    if is_correct {
        return Ok("✅ Doğru!".to_string());
    }
    let mut text = format!(
        "❌ Yanlış! Doğru cevap:\n{}",
        html::escape(&correct_answer_text(question))
    );
    if let Some(result) = session.exam_result()? {
        text.push_str(&format!(
            "\n\nHata puanı: {} / {} (kalan: {})",
            result.total_error_points,
            MAX_ERROR_POINTS,
            result.remaining_error_points()
        ));
    }
    Ok(text)
}

pub fn exam_verdict(result: &ExamResult) -> String {
    let mut text = if result.passed {
        "🎉 <b>TEBRİKLER! SINAVI GEÇTİNİZ</b>".to_string()
    } else {
        "❌ <b>MAALESEF KALDINIZ</b>".to_string()
    };
    text.push_str(&format!(
        "\n\nHata Puanı: {} (Maks. {})",
        result.total_error_points, MAX_ERROR_POINTS
    ));
    if result.five_point_error_count > 0 {
        text.push_str(&format!(
            "\n⚠️ {} adet 5 puanlık hata",
            result.five_point_error_count
        ));
    }
    let message = match result.failure_reason() {
        None => "Harika bir iş çıkardınız! Trafik kurallarına hakimsiniz.".to_string(),
        Some(FailureReason::TooManyFivePointErrors) => {
            "İki adet 5 puanlık soru yanlış yapıldığı için sınav başarısız.".to_string()
        }
        Some(FailureReason::ErrorPointLimitExceeded) => format!(
            "Toplam hata puanınız {} puan sınırını aştığı için sınav başarısız.",
            MAX_ERROR_POINTS
        ),
    };
    text.push_str("\n\n");
    text.push_str(&message);
    text
}

pub fn summary(session: &Session) -> Result<String, QuizError> {
    let mut text = match (session.mode(), session.exam_result()?) {
        (_, Some(result)) => exam_verdict(&result),
        (Mode::Study { title }, None) => format!(
            "<b>Konu Tamamlandı!</b>\n{}\n\nBaşarı: {}%",
            html::escape(title),
            session.percentage()?
        ),
        (Mode::Exam, None) => String::new(),
    };
    text.push_str(&format!(
        "\n\nToplam Puan: {} / {}\nCevaplanan: {} / {}",
        session.score()?,
        session.max_points(),
        session.answered_count(),
        session.len()
    ));
    Ok(text)
}
