use std::io::{self, BufRead, Write};

use quiz_core::session::{QuizEvent, QuizSession};
use services::QuizLoopService;
use ui::vm::{QuestionVm, QuizScreen, ResultsVm, quiz_screen};

/// Run a quiz on a line-oriented terminal until the player quits or input ends.
pub async fn play<R: BufRead, W: Write>(
    quiz_loop: &QuizLoopService,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "Quiz App")?;
    writeln!(out, "Loading questions...")?;
    let mut session = quiz_loop.load(&QuizSession::new()).await;

    loop {
        match quiz_screen(&session) {
            QuizScreen::Welcome {
                error: Some(message),
                ..
            } => {
                writeln!(out, "Could not load questions: {message}")?;
                match prompt(input, out, "[r]etry or [q]uit > ")?.as_deref() {
                    Some("r") => session = quiz_loop.load(&session).await,
                    Some("q") | None => return Ok(()),
                    Some(_) => {}
                }
            }
            QuizScreen::Welcome {
                can_start: true,
                question_count,
                ..
            } => {
                writeln!(out, "{question_count} questions ready.")?;
                match prompt(input, out, "Press Enter to start, q to quit > ")?.as_deref() {
                    Some("q") | None => return Ok(()),
                    Some(_) => session = quiz_loop.dispatch(&session, QuizEvent::Start),
                }
            }
            QuizScreen::Welcome { .. } => session = quiz_loop.load(&session).await,
            QuizScreen::Question(question) => {
                print_question(out, &question)?;
                let Some(line) = prompt(input, out, "> ")? else {
                    return Ok(());
                };
                if line == "q" {
                    return Ok(());
                }
                match parse_choice(&line, question.choices.len()) {
                    Some(index) => {
                        session = quiz_loop.dispatch(&session, QuizEvent::SelectAnswer { index });
                        session = quiz_loop.dispatch(&session, QuizEvent::Advance);
                    }
                    None => writeln!(
                        out,
                        "Pick a number between 1 and {}.",
                        question.choices.len()
                    )?,
                }
            }
            QuizScreen::Results(results) => {
                print_results(out, &results)?;
                match prompt(input, out, "[r]estart, [n]ew quiz or [q]uit > ")?.as_deref() {
                    Some("r") => session = quiz_loop.dispatch(&session, QuizEvent::Restart),
                    Some("n") => {
                        writeln!(out, "Loading questions...")?;
                        session = quiz_loop.new_quiz().await;
                    }
                    Some("q") | None => return Ok(()),
                    Some(_) => {}
                }
            }
        }
    }
}

/// Print `message` and read one trimmed, lowercased line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_ascii_lowercase()))
}

fn parse_choice(line: &str, len: usize) -> Option<usize> {
    let number: usize = line.parse().ok()?;
    (1..=len).contains(&number).then(|| number - 1)
}

fn print_question<W: Write>(out: &mut W, question: &QuestionVm) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", question.progress_label)?;
    if let Some(meta) = &question.meta {
        writeln!(out, "{meta}")?;
    }
    writeln!(out, "{}", question.prompt)?;
    for choice in &question.choices {
        writeln!(out, "  {}. {}", choice.index + 1, choice.label)?;
    }
    Ok(())
}

fn print_results<W: Write>(out: &mut W, results: &ResultsVm) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Quiz Results")?;
    writeln!(out, "{}", results.verdict_label)?;
    writeln!(out, "Correct answers: {}", results.correct)?;
    writeln!(out, "Wrong answers: {}", results.wrong)?;
    writeln!(out, "Score: {}", results.score_str)?;
    writeln!(out, "Time taken: {}", results.duration_str)?;
    Ok(())
}
