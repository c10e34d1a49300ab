mod config;
mod messages;
mod quiz;

use std::path::Path;
use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use log::{debug, error, info, warn};
use messages::*;
use quiz::{
    bank::QuestionBank, evaluator::parse_submission, sampler, session::Session, Media, MediaKind,
    MediaSource,
};
use teloxide::{
    dispatching::dialogue::{ErasedStorage, InMemStorage, Storage},
    prelude::*,
    types::{InputFile, KeyboardMarkup, ParseMode},
};

type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveModeChoice,
    ReceiveTheme,
    ReceiveChapter {
        theme: String,
    },
    InSession {
        session: Session,
    },
    Finished {
        session: Session,
    },
}

type SessionStorage = std::sync::Arc<ErasedStorage<State>>;

#[tokio::main]
async fn main() {
    let dotenv_loaded = dotenv();
    pretty_env_logger::init();
    if let Err(err) = dotenv_loaded {
        debug!("No .env file loaded: {}", err);
    }
    info!("Starting ehliyet bot...");

    let config = Config::from_env();

    info!("Loading questions from {}", config.questions_path.display());
    let bank = match QuestionBank::load(&config.questions_path) {
        Ok(bank) => Arc::new(bank),
        Err(err) => {
            error!(
                "Failed to load questions from {}: {}",
                config.questions_path.display(),
                err
            );
            std::process::exit(1);
        }
    };
    info!(
        "{} questions loaded in {} themes",
        bank.len(),
        bank.themes().len()
    );

    let bot = Bot::from_env();
    // Sessions only live as long as the process
    let storage: SessionStorage = InMemStorage::<State>::new().erase();
    let config = Arc::new(config);

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, ErasedStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::ReceiveModeChoice].endpoint(receive_mode_choice))
            .branch(dptree::case![State::ReceiveTheme].endpoint(receive_theme))
            .branch(dptree::case![State::ReceiveChapter { theme }].endpoint(receive_chapter))
            .branch(dptree::case![State::InSession { session }].endpoint(in_session))
            .branch(dptree::case![State::Finished { session }].endpoint(finished)),
    )
    .dependencies(dptree::deps![storage, bank, config])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

async fn send_html(bot: &Bot, chat_id: ChatId, text: String, keyboard: KeyboardMarkup) -> HandlerResult {
    bot.send_message(chat_id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboard)
        .await?;
    Ok(())
}

/// Uploads one photo or video. Remote media is passed to Telegram by URL.
async fn send_media(
    bot: &Bot,
    chat_id: ChatId,
    media: &Media<'_>,
    media_dir: &Path,
) -> HandlerResult {
    let file = match media.source {
        MediaSource::Local(path) => InputFile::file(media_dir.join(path)),
        MediaSource::Url(url) => InputFile::url(url.parse()?),
    };
    match media.kind {
        MediaKind::Image => bot.send_photo(chat_id, file).await?,
        MediaKind::Video => bot.send_video(chat_id, file).await?,
    };
    Ok(())
}

/// Sends the current question followed by its media. A media item that cannot
/// be sent is replaced by a link so the question stays answerable.
async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    session: &Session,
    media_dir: &Path,
) -> HandlerResult {
    send_html(bot, chat_id, render_question(session)?, question_keyboard(session)).await?;
    let question = match session.current() {
        Some(question) => question,
        None => return Ok(()),
    };
    for media in question.media() {
        if let Err(err) = send_media(bot, chat_id, &media, media_dir).await {
            warn!("Chat {}: could not send {:?}: {}", chat_id.0, media, err);
            bot.send_message(chat_id, media_link(&media))
                .parse_mode(ParseMode::Html)
                .await?;
        }
    }
    Ok(())
}

async fn show_main_menu(bot: &Bot, dialogue: &QuizDialogue, chat_id: ChatId) -> HandlerResult {
    bot.send_message(chat_id, "Çalışma modunu seçin")
        .reply_markup(mode_keyboard())
        .await?;
    dialogue.update(State::ReceiveModeChoice).await?;
    Ok(())
}

async fn show_themes(
    bot: &Bot,
    dialogue: &QuizDialogue,
    chat_id: ChatId,
    bank: &QuestionBank,
) -> HandlerResult {
    bot.send_message(chat_id, "Bir konu seçin")
        .reply_markup(list_keyboard(bank.themes(), &[BACK]))
        .await?;
    dialogue.update(State::ReceiveTheme).await?;
    Ok(())
}

/// Sends the intro and the first question, then hands the session to the dialogue.
async fn begin_session(
    bot: &Bot,
    dialogue: &QuizDialogue,
    chat_id: ChatId,
    session: Session,
    config: &Config,
) -> HandlerResult {
    send_html(bot, chat_id, session_intro(&session), question_keyboard(&session)).await?;
    send_question(bot, chat_id, &session, &config.media_dir).await?;
    dialogue.update(State::InSession { session }).await?;
    Ok(())
}

fn new_exam(bank: &QuestionBank, config: &Config) -> Session {
    let questions = sampler::sample(&bank.questions, config.exam_question_count);
    if questions.len() < config.exam_question_count {
        warn!(
            "Only {} questions available for a {} question exam",
            questions.len(),
            config.exam_question_count
        );
    }
    Session::exam(questions)
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT).await?;
    show_main_menu(&bot, &dialogue, msg.chat.id).await
}

async fn receive_mode_choice(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    bank: Arc<QuestionBank>,
    config: Arc<Config>,
) -> HandlerResult {
    match msg.text() {
        Some(STUDY_MODE) => show_themes(&bot, &dialogue, msg.chat.id, &bank).await,
        Some(EXAM_MODE) => {
            let session = new_exam(&bank, &config);
            info!("Chat {} started an exam with {} questions", msg.chat.id.0, session.len());
            begin_session(&bot, &dialogue, msg.chat.id, session, &config).await
        }
        _ => {
            bot.send_message(msg.chat.id, "Lütfen seçeneklerden birini seçin")
                .reply_markup(mode_keyboard())
                .await?;
            Ok(())
        }
    }
}

async fn receive_theme(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    bank: Arc<QuestionBank>,
) -> HandlerResult {
    let theme = match msg.text() {
        Some(BACK) => return show_main_menu(&bot, &dialogue, msg.chat.id).await,
        Some(text) if bank.themes().iter().any(|t| t == text) => text.to_string(),
        _ => {
            bot.send_message(msg.chat.id, "Lütfen listeden bir konu seçin")
                .await?;
            return Ok(());
        }
    };

    let chapters = bank
        .chapters(&theme)
        .into_iter()
        .map(|c| c.title())
        .collect::<Vec<_>>();
    bot.send_message(msg.chat.id, format!("{}\nBir bölüm seçin", theme))
        .reply_markup(list_keyboard(chapters, &[ALL_CHAPTERS, BACK]))
        .await?;

    dialogue.update(State::ReceiveChapter { theme }).await?;
    Ok(())
}

async fn receive_chapter(
    bot: Bot,
    dialogue: QuizDialogue,
    theme: String,
    msg: Message,
    bank: Arc<QuestionBank>,
    config: Arc<Config>,
) -> HandlerResult {
    let (title, questions) = match msg.text() {
        Some(BACK) => return show_themes(&bot, &dialogue, msg.chat.id, &bank).await,
        Some(ALL_CHAPTERS) => (theme.clone(), bank.questions_in(&theme, None)),
        Some(text) => match bank.chapters(&theme).into_iter().find(|c| c.title() == text) {
            Some(chapter) => (
                chapter.title(),
                bank.questions_in(&theme, Some(&chapter.number)),
            ),
            None => {
                bot.send_message(msg.chat.id, "Lütfen listeden bir bölüm seçin")
                    .await?;
                return Ok(());
            }
        },
        None => {
            bot.send_message(msg.chat.id, "Lütfen listeden bir bölüm seçin")
                .await?;
            return Ok(());
        }
    };

    if questions.is_empty() {
        bot.send_message(msg.chat.id, "Bu bölümde soru bulunamadı").await?;
        return Ok(());
    }

    info!(
        "Chat {} started studying '{}' with {} questions",
        msg.chat.id.0,
        title,
        questions.len()
    );
    let session = Session::study(title, questions);
    begin_session(&bot, &dialogue, msg.chat.id, session, &config).await
}

async fn in_session(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: Session,
    msg: Message,
    config: Arc<Config>,
) -> HandlerResult {
    let chat_id = msg.chat.id;
    let text = match msg.text() {
        Some(text) => text,
        None => {
            bot.send_message(chat_id, "Lütfen cevabınızı metin olarak gönderin")
                .await?;
            return Ok(());
        }
    };

    match text {
        PREVIOUS => {
            if !session.previous() {
                bot.send_message(chat_id, "Zaten ilk sorudasınız").await?;
                return Ok(());
            }
        }
        NEXT => {
            if !session.next() {
                return finish(&bot, &dialogue, chat_id, session).await;
            }
        }
        FINISH => return finish(&bot, &dialogue, chat_id, session).await,
        answer => {
            let question = match session.current() {
                Some(question) => question.clone(),
                None => return finish(&bot, &dialogue, chat_id, session).await,
            };
            if session.current_answer().is_some() {
                bot.send_message(
                    chat_id,
                    format!("Bu soru zaten cevaplandı. Devam etmek için \"{}\"", NEXT),
                )
                .await?;
                return Ok(());
            }

            let submission = match parse_submission(&question, answer) {
                Ok(Some(submission)) => submission,
                Ok(None) => {
                    bot.send_message(chat_id, "Lütfen bir cevap gönderin").await?;
                    return Ok(());
                }
                Err(err) => {
                    warn!("Chat {}: {}", chat_id.0, err);
                    bot.send_message(
                        chat_id,
                        "Bu seçenek yok. Lütfen sorudaki harflerden seçin",
                    )
                    .await?;
                    return Ok(());
                }
            };

            let is_correct = match session.submit(submission) {
                Ok(is_correct) => is_correct,
                Err(err) if err.is_data_integrity() => {
                    error!("Chat {}: broken question bank: {}", chat_id.0, err);
                    bot.send_message(
                        chat_id,
                        format!(
                            "Soru bankasında hatalı bir soru bulundu ({}). Oturum sonlandırıldı.",
                            question.question_id
                        ),
                    )
                    .await?;
                    return show_main_menu(&bot, &dialogue, chat_id).await;
                }
                Err(err) => return Err(err.into()),
            };

            bot.send_message(chat_id, feedback(&session, &question, is_correct)?)
                .parse_mode(ParseMode::Html)
                .await?;

            if !session.next() {
                return finish(&bot, &dialogue, chat_id, session).await;
            }
        }
    }

    send_question(&bot, chat_id, &session, &config.media_dir).await?;
    dialogue.update(State::InSession { session }).await?;
    Ok(())
}

async fn finish(
    bot: &Bot,
    dialogue: &QuizDialogue,
    chat_id: ChatId,
    session: Session,
) -> HandlerResult {
    if let Some(result) = session.exam_result()? {
        info!(
            "Chat {} finished an exam: passed={} error_points={} five_point_errors={}",
            chat_id.0, result.passed, result.total_error_points, result.five_point_error_count
        );
    }
    send_html(bot, chat_id, summary(&session)?, summary_keyboard(&session)).await?;
    dialogue.update(State::Finished { session }).await?;
    Ok(())
}

async fn finished(
    bot: Bot,
    dialogue: QuizDialogue,
    mut session: Session,
    msg: Message,
    bank: Arc<QuestionBank>,
    config: Arc<Config>,
) -> HandlerResult {
    match msg.text() {
        Some(RESTART_EXAM) if session.is_exam() => {
            let session = new_exam(&bank, &config);
            begin_session(&bot, &dialogue, msg.chat.id, session, &config).await
        }
        Some(RESTART_STUDY) if !session.is_exam() => {
            session.restart();
            begin_session(&bot, &dialogue, msg.chat.id, session, &config).await
        }
        Some(MAIN_MENU) => show_main_menu(&bot, &dialogue, msg.chat.id).await,
        _ => {
            bot.send_message(msg.chat.id, "Lütfen seçeneklerden birini seçin")
                .reply_markup(summary_keyboard(&session))
                .await?;
            Ok(())
        }
    }
}
