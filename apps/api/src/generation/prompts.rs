// All prompt constants for the generation chain. Templates carry
// `{placeholder}` markers replaced before sending; few-shot examples stay in
// the user message.

/// System prompt for intent derivation — expand the raw description into a
/// fuller statement of what the post should be.
pub const INTENT_SYSTEM: &str = "You will receive a request and you will extract the meaning. \
    Add additional context that would help explain and expand on the meaning included. \
    Only take the meaning and return the expanded meaning without any other text. \
    Let's make sure we take a deep breath and think step by step. \
    Only respond with the expanded understanding.";

/// Intent derivation template. Replace `{description}` and `{business_context}`.
pub const INTENT_PROMPT_TEMPLATE: &str = r#"human: I want to create an instagram post about real estate
agent: Elaborate an instagram post that follows best practices and is witty, interesting and appealing. The topic of the post is Real Estate.

human: I want to create an instagram post about technology
agent: Create an engaging and visually appealing Instagram post that centers around the topic of technology. Consider incorporating current tech trends or news, highlighting a new gadget or app, or showcasing how technology has impacted daily life. Use a creative and witty caption to grab the attention of your audience and encourage engagement with your post.

human: I want to create a blog about how hackathons are cool
agent: Write a blog post that highlights the benefits and excitement of participating in hackathons. Discuss the collaborative environment and the opportunity to work with like-minded individuals. Share success stories of previous hackathon participants and the innovative solutions that were created. Use a conversational tone and personal anecdotes to make the post relatable and engaging.

user: {description} make sure to base it on the following business: {business_context}"#;

/// System prompt for the caption-prompt synthesis stage.
pub const CAPTION_PROMPT_SYSTEM: &str = "You are an AI assistant that writes prompts that \
    produce outstanding Instagram captions. You will take the input and return a prompt \
    ready to go into the next agent to actually produce a caption. \
    Let's think step by step. ONLY RETURN THE PROMPT.";

/// Caption-prompt template. Replace `{intent}` and `{business_context}`.
pub const CAPTION_PROMPT_TEMPLATE: &str = r#"human: I want to do an Instagram caption about real estate.
agent: Craft an Instagram caption that showcases the beauty and diversity of the world of real estate. Highlight the unique features of your property, such as the stunning views, the stylish interiors, or the spacious layout. Use emotive language to evoke a sense of desire and aspiration in your followers. End your caption with a clear call-to-action, such as "Book a viewing today!" or "Click the link in our bio to learn more."

human: I want to do an Instagram caption about a hackathon.
agent: Craft an Instagram caption that brings the high-energy, creative world of hackathons to life. Highlight the unique moments that make hackathons so unforgettable - from the initial spark of an idea to the adrenaline rush of a breakthrough. Use humor to celebrate the quirks of hackathon culture, like the endless supply of caffeine and pizza that fuels late-night coding sessions.

user: I want to do an Instagram caption about {intent} make sure to base it on the following business: {business_context}"#;

/// System prompt for the image-prompt synthesis stage.
pub const IMAGE_PROMPT_SYSTEM: &str = "You are an AI assistant that writes prompts that \
    produce outstanding Instagram images. You will take the input and return a prompt \
    ready to go into the next agent to actually produce an image. \
    Let's think step by step. ONLY RETURN THE PROMPT.";

/// Image-prompt template. Replace `{intent}`, `{business_context}`,
/// `{image_model}`, `{tone}`, `{mood}`.
pub const IMAGE_PROMPT_TEMPLATE: &str = r#"human: Create an image that has a beautiful house.
agent: Generate an image of a beautiful, modern house at sunset. The house should have large glass windows reflecting the orange and pink hues of the sky, surrounded by lush, manicured gardens. Include a cobblestone pathway leading up to a grand, wooden front door, with soft, warm lighting coming from inside the house. In the background, there should be a view of distant mountains, adding to the serene and picturesque setting.

human: Create an image that has an alien on the moon.
agent: Generate an image of an alien standing on the moon's surface, gazing at Earth. The alien should be humanoid, with a sleek, metallic suit reflecting the moon's gray terrain and Earth's blue hues in the distance. The lunar landscape around the alien should feature detailed craters, rocks, and the iconic footprints of the first astronauts. The sky should be a deep, star-filled black.

user: Create an image about {intent} for the {image_model} image generator, make sure to base it on the following business: {business_context}
The tone should be {tone} and the mood should be {mood}"#;

/// System prompt for final caption generation. Combined with the shared
/// JSON-only fragment at call time to enforce the three-caption JSON shape.
pub const CAPTION_GENERATION_SYSTEM: &str = "You are an AI assistant acting as an expert in \
    social media and content generation. \
    You are tasked with generating three engaging, creative, and potentially viral captions \
    for Instagram posts. \
    The captions MUST be based on the provided topic, adhere to the specified tone, include \
    a compelling call to action and appropriate keywords and hashtags. \
    They must be concise, align with Instagram's community guidelines, and be tailored to \
    resonate with a broad social media audience. \
    Do the best you can with the information you have to immediately create the captions. \
    Return ONLY the captions in a JSON format.";

/// Caption generation template. Replace `{caption_prompt}`.
pub const CAPTION_GENERATION_TEMPLATE: &str = r#"human: Craft a caption about technology.
agent: { "caption1": "This is the first caption", "caption2": "This is the second caption", "caption3": "This is the third caption"}

user: {caption_prompt}"#;
